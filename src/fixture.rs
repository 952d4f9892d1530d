//! Building encoded data for tests.
//!
//! The functions here produce BER encoded values from their parts. Nested
//! values are given as a slice of already encoded values.
#![cfg(test)]

use crate::ident::{Ident, Tag};
use crate::length::Length;


/// Returns a primitive value with the given content octets.
pub fn primitive(tag: Tag, content: impl AsRef<[u8]>) -> Vec<u8> {
    let content = content.as_ref();
    let mut res = Ident::from_tag(tag, false).as_slice().to_vec();
    Length::definite_from(content.len()).append_encoded(&mut res);
    res.extend_from_slice(content);
    res
}

pub use self::primitive as prim;


/// Returns a constructed value with definite length.
pub fn definite_constructed(tag: Tag, content: &[Vec<u8>]) -> Vec<u8> {
    let content = content.concat();
    let mut res = Ident::from_tag(tag, true).as_slice().to_vec();
    Length::definite_from(content.len()).append_encoded(&mut res);
    res.extend_from_slice(&content);
    res
}

pub use self::definite_constructed as dcons;


/// Returns a constructed value with indefinite length.
pub fn indefinite_constructed(tag: Tag, content: &[Vec<u8>]) -> Vec<u8> {
    let mut res = Ident::from_tag(tag, true).as_slice().to_vec();
    Length::INDEFINITE.append_encoded(&mut res);
    res.extend_from_slice(&content.concat());
    res.extend_from_slice(b"\0\0");
    res
}

pub use self::indefinite_constructed as icons;
