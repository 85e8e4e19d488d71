mod memo;
mod settings;

pub use memo::{Memo, MemoUpdate, NewMemo, Quadrant};
pub use settings::Settings;
