// Licensed under the Apache-2.0 license

//! Integration tests for the Hoth utility host library
//!
//! Operations run end to end against a mock device speaking the SECURITY_V2
//! wire format, or against a mock session that fills response slots directly.



#[cfg(test)]
pub mod test_get_token_set_info;

#[cfg(test)]
pub mod test_get_tokens_in_set;
