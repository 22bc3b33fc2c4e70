mod fetch;
mod list;
mod remove;
mod show;

pub use fetch::cmd_fetch;
pub use list::cmd_list_records;
pub use remove::cmd_remove_record;
pub use show::cmd_show_record;

use crate::config::Config;
use crate::services::RecordService;
use crate::state::SharedState;
use std::sync::Arc;

async fn record_service(config: &Config) -> anyhow::Result<Arc<dyn RecordService>> {
    Ok(SharedState::new(config.clone()).await?.records)
}

fn parse_id(id_str: &str) -> Option<i32> {
    id_str.parse::<i32>().ok().filter(|id| *id > 0)
}
