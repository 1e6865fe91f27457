// Wire-level request models

pub mod tealium;
