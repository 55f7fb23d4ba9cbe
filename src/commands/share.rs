use crate::args::ShareArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::share::{render_share_text, ShareRange};
use crate::{Config, Result};
use chrono::Local;

/// Renders the share text for the requested days. The text ends with a sync block that `import`
/// understands.
pub async fn share(config: Config, args: ShareArgs) -> Result<Out<()>> {
    let start = args.date().unwrap_or_else(|| Local::now().date_naive());
    let days = args.days().unwrap_or(config.share_days());
    let range = ShareRange::new(start, days).with_member(args.member());

    let store = config.store().pub_result(ErrorType::Storage)?;
    let entries = store.load_all().pub_result(ErrorType::Storage)?;
    Ok(Out::new_message(render_share_text(&range, &entries)))
}
