pub mod coin_search;
pub mod confirmation;
pub mod multi_picker;
pub mod pair_time_picker;
pub mod picker;
pub mod screen;

pub use coin_search::{CoinSearch, CoinSearchState, SearchAction, SearchOutcome};
pub use confirmation::confirmation;
pub use multi_picker::{MultiPicker, MultiPickerOutcome, MultiPickerState};
pub use pair_time_picker::{PairTimeOutcome, PairTimePicker, PairTimeState};
pub use picker::{auto_layout, go_back_button, go_back_row, parse_choice, picker};
pub use screen::{Reply, Screen};
