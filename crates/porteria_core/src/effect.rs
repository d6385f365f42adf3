use crate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistApiUrl { url: String },
    Lookup {
        request_id: RequestId,
        api_url: String,
        token: String,
    },
    FetchPhoto { request_id: RequestId, url: String },
    StartScan,
    CancelScan,
}
