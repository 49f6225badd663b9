use {
    crate::DomainSeparator,
    alloy::primitives::{Bytes, keccak256},
    anyhow::{Result, anyhow, bail, ensure},
    contracts::ICoWSwapOnchainOrders::OnchainSignature,
    serde::{Deserialize, Serialize},
    std::fmt::{self, Debug, Formatter},
};

/// See [`Signature`].
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SigningScheme {
    #[default]
    Eip712,
    EthSign,
    Eip1271,
    PreSign,
}

/// The signing schemes an order placed by a contract can use. The numeric
/// values are the ones emitted in `OrderPlacement` events.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Hash)]
#[repr(u8)]
pub enum OnchainSigningScheme {
    Eip1271 = 0,
    PreSign = 1,
}

impl TryFrom<u8> for OnchainSigningScheme {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Eip1271),
            1 => Ok(Self::PreSign),
            _ => Err(anyhow!("unknown onchain signing scheme {value}")),
        }
    }
}

impl From<OnchainSigningScheme> for u8 {
    fn from(scheme: OnchainSigningScheme) -> Self {
        scheme as u8
    }
}

impl From<OnchainSigningScheme> for SigningScheme {
    fn from(scheme: OnchainSigningScheme) -> Self {
        match scheme {
            OnchainSigningScheme::Eip1271 => Self::Eip1271,
            OnchainSigningScheme::PreSign => Self::PreSign,
        }
    }
}

/// Signature of an order owned by a smart contract. Only the schemes that
/// don't rely on ECDSA owner recovery are representable.
#[derive(Eq, PartialEq, Clone, Deserialize, Serialize, Hash)]
#[serde(into = "JsonSignature", try_from = "JsonSignature")]
pub enum Signature {
    /// Signature verified according to EIP-1271, which facilitates a way for
    /// contracts to verify signatures using an arbitrary method. The order
    /// hash is passed to the verification method, along with this signature.
    ///
    /// https://eips.ethereum.org/EIPS/eip-1271
    Eip1271(Vec<u8>),
    /// For these signatures, the owner approves the order hash in an onchain
    /// transaction.
    PreSign,
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Signature::PreSign => f.write_str("PreSign"),
            Signature::Eip1271(bytes) => f
                .debug_tuple("Eip1271")
                .field(&const_hex::encode_prefixed(bytes))
                .finish(),
        }
    }
}

impl Signature {
    pub fn from_bytes(scheme: SigningScheme, bytes: &[u8]) -> Result<Self> {
        Ok(match scheme {
            SigningScheme::Eip712 | SigningScheme::EthSign => {
                bail!("ECDSA signatures are not supported for contract orders")
            }
            SigningScheme::Eip1271 => Self::Eip1271(bytes.to_vec()),
            SigningScheme::PreSign => {
                ensure!(
                    bytes.is_empty() || bytes.len() == 20,
                    "presign signature bytes should be empty or an address (legacy)",
                );
                Self::PreSign
            }
        })
    }

    #[allow(clippy::wrong_self_convention)]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Eip1271(signature) => signature.clone(),
            Self::PreSign => Vec::new(),
        }
    }

    pub fn scheme(&self) -> SigningScheme {
        match self {
            Signature::Eip1271(_) => SigningScheme::Eip1271,
            Signature::PreSign => SigningScheme::PreSign,
        }
    }
}

impl TryFrom<OnchainSignature> for Signature {
    type Error = anyhow::Error;

    fn try_from(signature: OnchainSignature) -> Result<Self> {
        let scheme = OnchainSigningScheme::try_from(signature.scheme)?;
        Self::from_bytes(scheme.into(), &signature.data)
    }
}

/// An internal type used for deriving `serde` implementations for the
/// `Signature` type.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSignature {
    signing_scheme: SigningScheme,
    signature: Bytes,
}

impl From<Signature> for JsonSignature {
    fn from(signature: Signature) -> Self {
        Self {
            signing_scheme: signature.scheme(),
            signature: signature.to_bytes().into(),
        }
    }
}

impl TryFrom<JsonSignature> for Signature {
    type Error = anyhow::Error;

    fn try_from(json: JsonSignature) -> Result<Self, Self::Error> {
        Self::from_bytes(json.signing_scheme, &json.signature)
    }
}

pub fn hashed_eip712_message(
    domain_separator: &DomainSeparator,
    struct_hash: &[u8; 32],
) -> [u8; 32] {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(&domain_separator.0);
    message[34..66].copy_from_slice(struct_hash);
    keccak256(message).0
}
