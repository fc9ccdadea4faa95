use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(super) struct AskQuery {
    pub domain: String,
}

#[derive(Serialize, Debug, Clone, Default, Ord, PartialOrd, Eq, PartialEq)]
pub(super) struct AskResult {
    pub domain: String,
}
