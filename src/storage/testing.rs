//! Unit-test access to the shared result fixtures

use std::io::Cursor;
use std::path::Path;

use super::Header;
use crate::codec::TextEncoding;
use crate::config::LimitsConfig;

#[path = "../../tests/common/mod.rs"]
mod common;

pub(crate) use common::{coordinate_value, thermal_value, ResultFixture, THERMAL_SAMPLE};

impl ResultFixture {
    /// Decode [`ResultFixture::header_bytes`] with default limits
    pub fn header(&self) -> Header {
        Header::read_from(
            &mut Cursor::new(self.header_bytes()),
            Path::new("fixture.hdr"),
            TextEncoding::latin_1(),
            &LimitsConfig::default(),
        )
        .unwrap()
    }
}
