mod list;
mod run;

pub use list::List;
pub use run::Run;

use std::path::PathBuf;

use battle_content::ContentFactory;

fn factory(data_dir: Option<PathBuf>) -> ContentFactory {
    data_dir.map_or_else(ContentFactory::bundled, ContentFactory::new)
}
