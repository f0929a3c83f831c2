//! The fixed header every operator payload starts with.
//!
//! Layout: `[input asset: 20 bytes][output asset: 20 bytes][operator body ...]`.
//! The factory decodes only the header, to cross-check the output asset an order
//! claims. Everything after it is operator specific and passed on verbatim.

use crate::error::CoreError;
use crate::structs::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadHeader {
    pub input: Address,
    pub output: Address,
}

impl PayloadHeader {
    pub const LEN: usize = Address::LEN * 2;

    pub fn new(input: Address, output: Address) -> Self {
        Self { input, output }
    }

    /// Splits a payload into its header and the operator-specific body.
    pub fn decode(payload: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if payload.len() < Self::LEN {
            return Err(CoreError::MalformedPayload {
                len: payload.len(),
                required: Self::LEN,
            });
        }
        let (header, body) = payload.split_at(Self::LEN);
        let (input, output) = header.split_at(Address::LEN);

        // Both halves are exactly 20 bytes after the length check above.
        let input = Address::from_slice(input).ok_or(CoreError::MalformedPayload {
            len: payload.len(),
            required: Self::LEN,
        })?;
        let output = Address::from_slice(output).ok_or(CoreError::MalformedPayload {
            len: payload.len(),
            required: Self::LEN,
        })?;

        Ok((Self { input, output }, body))
    }

    /// Builds a payload from this header and an operator body.
    pub fn encode(&self, body: &[u8]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(Self::LEN + body.len());
        payload.extend_from_slice(self.input.as_bytes());
        payload.extend_from_slice(self.output.as_bytes());
        payload.extend_from_slice(body);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_header_from_body() {
        let header = PayloadHeader::new(Address::from_label("DAI"), Address::from_label("UNI"));
        let payload = header.encode(b"router-call");

        let (decoded, body) = PayloadHeader::decode(&payload).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(body, b"router-call");
    }

    #[test]
    fn decode_accepts_an_empty_body() {
        let header = PayloadHeader::new(Address::from_label("A"), Address::from_label("B"));
        let encoded = header.encode(&[]);
        let (decoded, body) = PayloadHeader::decode(&encoded).unwrap();
        assert_eq!(decoded, header);
        assert!(body.is_empty());
    }

    #[test]
    fn truncated_header_is_rejected() {
        let payload = Address::from_label("DAI").as_bytes().to_vec();
        assert_eq!(
            PayloadHeader::decode(&payload),
            Err(CoreError::MalformedPayload { len: 20, required: 40 })
        );
    }
}
