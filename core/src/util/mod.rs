mod clock;

pub use clock::{next_stamp, Clock, SystemClock};
