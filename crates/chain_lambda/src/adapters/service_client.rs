#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    pub status_code: u16,
    pub body: Vec<u8>,
}

pub trait ServiceClient {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<ServiceReply, String>;
}
