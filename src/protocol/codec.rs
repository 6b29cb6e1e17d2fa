// Custodian — Response codec
//
// Structural validation of the module's reply. Every blob is hex-decoded and
// checked against its declared length before any cryptography runs; the
// first mismatch fails the whole response.

use std::fmt;

use num_bigint::BigUint;

use super::{ParseError, VaultId};
use crate::crypto::encode_signed_be;

/// Number of lines a well-formed response carries.
pub const RESPONSE_FIELDS: usize = 9;

const SIGNATURE_LEN_LINE: usize = 0;
const SIGNATURE_LINE: usize = 1;
const MAC_LEN_LINE: usize = 2;
const MAC_LINE: usize = 3;
const IV_LINE: usize = 4;
const CIPHERTEXT_LEN_LINE: usize = 5;
const CIPHERTEXT_LINE: usize = 6;
const PUBLIC_VALUE_BITS_LINE: usize = 7;
const PUBLIC_VALUE_LINE: usize = 8;

/// Names the response field a parse error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseField {
    Signature,
    Mac,
    Iv,
    Ciphertext,
    ModulePublicValue,
}

impl fmt::Display for ResponseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseField::Signature => "signature",
            ResponseField::Mac => "MAC",
            ResponseField::Iv => "IV",
            ResponseField::Ciphertext => "ciphertext",
            ResponseField::ModulePublicValue => "module public value",
        };
        f.write_str(name)
    }
}

/// A structurally valid module reply.
#[derive(Clone, PartialEq, Eq)]
pub struct ModuleResponse {
    signature: Vec<u8>,
    mac: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    module_public_value: BigUint,
}

impl ModuleResponse {
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn mac(&self) -> &[u8] {
        &self.mac
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn module_public_value(&self) -> &BigUint {
        &self.module_public_value
    }
}

impl fmt::Debug for ModuleResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleResponse")
            .field("signature_len", &self.signature.len())
            .field("mac_len", &self.mac.len())
            .field("iv_len", &self.iv.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .field("module_public_value_bits", &self.module_public_value.bits())
            .finish()
    }
}

/// Request lines for one exchange: our public value, then the vault slot.
pub fn encode_request(own_public_value: &BigUint, vault: VaultId) -> Vec<String> {
    vec![own_public_value.to_str_radix(16), vault.to_string()]
}

/// Parse and structurally validate the proxy's output.
pub fn decode(text: &str) -> Result<ModuleResponse, ParseError> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    if lines.len() < RESPONSE_FIELDS {
        return Err(ParseError::TooFewFields {
            found: lines.len(),
            expected: RESPONSE_FIELDS,
        });
    }

    // The module labels this a bit length but it counts bytes.
    let signature = decode_blob(&lines, SIGNATURE_LINE, ResponseField::Signature)?;
    let declared = parse_len(&lines, SIGNATURE_LEN_LINE, ResponseField::Signature)?;
    check_len(ResponseField::Signature, declared, signature.len())?;

    let ciphertext = decode_blob(&lines, CIPHERTEXT_LINE, ResponseField::Ciphertext)?;
    let declared = parse_len(&lines, CIPHERTEXT_LEN_LINE, ResponseField::Ciphertext)?;
    check_len(ResponseField::Ciphertext, declared, ciphertext.len())?;

    let mac = decode_blob(&lines, MAC_LINE, ResponseField::Mac)?;
    let declared = parse_len(&lines, MAC_LEN_LINE, ResponseField::Mac)?;
    check_len(ResponseField::Mac, declared, mac.len())?;

    let iv = decode_blob(&lines, IV_LINE, ResponseField::Iv)?;

    let module_public_value = BigUint::parse_bytes(lines[PUBLIC_VALUE_LINE].as_bytes(), 16)
        .ok_or(ParseError::NonHex {
            field: ResponseField::ModulePublicValue,
        })?;
    let declared = parse_len(&lines, PUBLIC_VALUE_BITS_LINE, ResponseField::ModulePublicValue)?;
    let actual_bits = encode_signed_be(&module_public_value).len() * 8;
    check_len(ResponseField::ModulePublicValue, declared, actual_bits)?;

    Ok(ModuleResponse {
        signature,
        mac,
        iv,
        ciphertext,
        module_public_value,
    })
}

fn decode_blob(lines: &[&str], index: usize, field: ResponseField) -> Result<Vec<u8>, ParseError> {
    hex::decode(lines[index]).map_err(|_| ParseError::NonHex { field })
}

fn parse_len(lines: &[&str], index: usize, field: ResponseField) -> Result<usize, ParseError> {
    lines[index]
        .parse::<usize>()
        .map_err(|_| ParseError::NonNumeric {
            field,
            value: lines[index].to_string(),
        })
}

fn check_len(field: ResponseField, declared: usize, actual: usize) -> Result<(), ParseError> {
    if declared != actual {
        return Err(ParseError::LengthMismatch {
            field,
            declared,
            actual,
        });
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
