//! Turning a fetch outcome into a parsed item list.
//!
//! The dispatcher runs it on the blocking pool once a fetch returns.  It never
//! touches the store; the result is handed to the marshaller, which decides
//! what is new.

use std::sync::Arc;

use crate::error::FeedError;
use crate::fetch::FetchResponse;
use crate::source::{FeedParser, ParsedFeed};

const HTTP_OK: u16 = 200;

#[derive(Clone)]
pub struct ResponseHandler {
    parser: Arc<dyn FeedParser>,
}

impl ResponseHandler {
    pub fn new(parser: Arc<dyn FeedParser>) -> Self {
        Self { parser }
    }

    /// Anything but a 200 with a parseable body abandons the update; the
    /// parser's partial output is never returned.
    pub fn handle(&self, response: Result<FetchResponse, FeedError>) -> Result<ParsedFeed, FeedError> {
        let response = response?;
        if response.status != HTTP_OK {
            return Err(FeedError::HttpStatus(response.status));
        }
        self.parser.parse(&response.body)
    }
}
