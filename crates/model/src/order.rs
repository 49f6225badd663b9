//! Contains the order type with conversions to and from the settlement
//! contract encoding and serialization as the order relay API expects it.

use {
    crate::{DomainSeparator, signature::{Signature, hashed_eip712_message}},
    alloy::primitives::{Address, B256, U256, keccak256},
    anyhow::{Result, anyhow},
    contracts::GPv2Order,
    hex_literal::hex,
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, DisplayFromStr, SerializeDisplay, serde_as},
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
};

/// An order as it is hashed and signed for the settlement contract.
#[serde_as]
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub sell_token: Address,
    pub buy_token: Address,
    #[serde(default)]
    pub receiver: Option<Address>,
    #[serde_as(as = "DisplayFromStr")]
    pub sell_amount: U256,
    #[serde_as(as = "DisplayFromStr")]
    pub buy_amount: U256,
    pub valid_to: u32,
    pub app_data: B256,
    #[serde_as(as = "DisplayFromStr")]
    pub fee_amount: U256,
    pub kind: OrderKind,
    pub partially_fillable: bool,
    #[serde(default)]
    pub sell_token_balance: SellTokenSource,
    #[serde(default)]
    pub buy_token_balance: BuyTokenDestination,
}

impl OrderData {
    pub const BALANCE_ERC20: [u8; 32] =
        hex!("5a28e9363bb942b639270062aa6bb295f434bcdfc42c97267bf003f272060dc9");
    pub const BALANCE_EXTERNAL: [u8; 32] =
        hex!("abee3b73373acd583a130924aad6dc38cfdc44ba0555ba94ce2ff63980ea0632");
    pub const BALANCE_INTERNAL: [u8; 32] =
        hex!("4ac99ace14ee0a5ef932dc609df0943ab7ac16b7583634612f8dc35a4289a6ce");
    // keccak256("Order(address sellToken,address buyToken,address receiver,uint256 sellAmount,uint256 buyAmount,uint32 validTo,bytes32 appData,uint256 feeAmount,string kind,bool partiallyFillable,string sellTokenBalance,string buyTokenBalance)")
    pub const TYPE_HASH: [u8; 32] =
        hex!("d5a25ba2e97094ad7d83dc28a6572da797d6b3e7fc6663bd93efb789fc17e489");

    pub fn hash_struct(&self) -> [u8; 32] {
        let mut hash_data = [0u8; 416];
        hash_data[0..32].copy_from_slice(&Self::TYPE_HASH);
        // Some slots are not assigned (stay 0) because all values are extended to 256 bits.
        hash_data[44..64].copy_from_slice(self.sell_token.as_slice());
        hash_data[76..96].copy_from_slice(self.buy_token.as_slice());
        hash_data[108..128].copy_from_slice(self.receiver.unwrap_or_default().as_slice());
        hash_data[128..160].copy_from_slice(&self.sell_amount.to_be_bytes::<32>());
        hash_data[160..192].copy_from_slice(&self.buy_amount.to_be_bytes::<32>());
        hash_data[220..224].copy_from_slice(&self.valid_to.to_be_bytes());
        hash_data[224..256].copy_from_slice(self.app_data.as_slice());
        hash_data[256..288].copy_from_slice(&self.fee_amount.to_be_bytes::<32>());
        hash_data[288..320].copy_from_slice(&self.kind.as_contract_bytes());
        hash_data[351] = self.partially_fillable as u8;
        hash_data[352..384].copy_from_slice(&self.sell_token_balance.as_contract_bytes());
        hash_data[384..416].copy_from_slice(&self.buy_token_balance.as_contract_bytes());
        keccak256(hash_data).0
    }

    /// The EIP-712 signing hash of the order for the given domain.
    pub fn hash(&self, domain: &DomainSeparator) -> B256 {
        B256::from(hashed_eip712_message(domain, &self.hash_struct()))
    }

    pub fn uid(&self, domain: &DomainSeparator, owner: &Address) -> OrderUid {
        OrderUid::from_parts(self.hash(domain), *owner, self.valid_to)
    }
}

impl From<OrderData> for GPv2Order::Data {
    fn from(order: OrderData) -> Self {
        Self {
            sellToken: order.sell_token,
            buyToken: order.buy_token,
            receiver: order.receiver.unwrap_or_default(),
            sellAmount: order.sell_amount,
            buyAmount: order.buy_amount,
            validTo: order.valid_to,
            appData: order.app_data,
            feeAmount: order.fee_amount,
            kind: order.kind.as_contract_bytes().into(),
            partiallyFillable: order.partially_fillable,
            sellTokenBalance: order.sell_token_balance.as_contract_bytes().into(),
            buyTokenBalance: order.buy_token_balance.as_contract_bytes().into(),
        }
    }
}

impl TryFrom<GPv2Order::Data> for OrderData {
    type Error = anyhow::Error;

    fn try_from(order: GPv2Order::Data) -> Result<Self> {
        Ok(Self {
            sell_token: order.sellToken,
            buy_token: order.buyToken,
            receiver: (!order.receiver.is_zero()).then_some(order.receiver),
            sell_amount: order.sellAmount,
            buy_amount: order.buyAmount,
            valid_to: order.validTo,
            app_data: order.appData,
            fee_amount: order.feeAmount,
            kind: OrderKind::from_contract_bytes(order.kind.0)?,
            partially_fillable: order.partiallyFillable,
            sell_token_balance: SellTokenSource::from_contract_bytes(order.sellTokenBalance.0)?,
            buy_token_balance: BuyTokenDestination::from_contract_bytes(order.buyTokenBalance.0)?,
        })
    }
}

// An order as provided to the orderbook.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreation {
    #[serde(flatten)]
    pub data: OrderData,
    pub from: Option<Address>,
    #[serde(flatten)]
    pub signature: Signature,
}

impl OrderCreation {
    /// The uid the orderbook assigns to the order. Smart contract orders
    /// cannot be recovered from their signature, so they need `from`.
    pub fn uid(&self, domain: &DomainSeparator) -> Option<OrderUid> {
        self.from.map(|owner| self.data.uid(domain, &owner))
    }
}

// uid as 56 bytes: 32 for orderDigest, 20 for ownerAddress and 4 for validTo
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct OrderUid(pub [u8; 56]);

impl OrderUid {
    /// Create a UID from its parts.
    pub fn from_parts(hash: B256, owner: Address, valid_to: u32) -> Self {
        let mut uid = [0; 56];
        uid[0..32].copy_from_slice(hash.as_slice());
        uid[32..52].copy_from_slice(owner.as_slice());
        uid[52..56].copy_from_slice(&valid_to.to_be_bytes());
        Self(uid)
    }

    /// Splits an order UID into its parts.
    pub fn parts(&self) -> (B256, Address, u32) {
        let mut valid_to = [0u8; 4];
        valid_to.copy_from_slice(&self.0[52..56]);
        (
            B256::from_slice(&self.0[0..32]),
            Address::from_slice(&self.0[32..52]),
            u32::from_be_bytes(valid_to),
        )
    }
}

impl FromStr for OrderUid {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<OrderUid, Self::Err> {
        let mut value = [0u8; 56];
        let s_without_prefix = s.strip_prefix("0x").unwrap_or(s);
        const_hex::decode_to_slice(s_without_prefix, value.as_mut())?;
        Ok(OrderUid(value))
    }
}

impl Display for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode_prefixed(self.0))
    }
}

impl fmt::Debug for OrderUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Default for OrderUid {
    fn default() -> Self {
        Self([0u8; 56])
    }
}

#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    #[default]
    Buy,
    Sell,
}

impl OrderKind {
    // keccak256("sell")
    pub const SELL: [u8; 32] =
        hex!("f3b277728b3fee749481eb3e0b3b48980dbbab78658fc419025cb16eee346775");
    // keccak256("buy")
    pub const BUY: [u8; 32] =
        hex!("6ed88e868af0a1983e3886d5f3e95a2fafbd6c3450bc229e27342283dc429ccc");

    pub fn as_contract_bytes(&self) -> [u8; 32] {
        match self {
            Self::Sell => Self::SELL,
            Self::Buy => Self::BUY,
        }
    }

    pub fn from_contract_bytes(kind: [u8; 32]) -> Result<Self> {
        match kind {
            Self::SELL => Ok(OrderKind::Sell),
            Self::BUY => Ok(OrderKind::Buy),
            _ => Err(anyhow!("Order kind is not well defined")),
        }
    }
}

/// Source from which the sellAmount should be drawn upon order fulfillment
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SellTokenSource {
    /// Direct ERC20 allowances to the Vault relayer contract
    #[default]
    Erc20,
    /// ERC20 allowances to the Vault with GPv2 relayer approval
    Internal,
    /// Internal balances to the Vault with GPv2 relayer approval
    External,
}

impl SellTokenSource {
    pub fn as_contract_bytes(&self) -> [u8; 32] {
        match self {
            Self::Erc20 => OrderData::BALANCE_ERC20,
            Self::External => OrderData::BALANCE_EXTERNAL,
            Self::Internal => OrderData::BALANCE_INTERNAL,
        }
    }

    pub fn from_contract_bytes(bytes: [u8; 32]) -> Result<Self> {
        match bytes {
            OrderData::BALANCE_INTERNAL => Ok(Self::Internal),
            OrderData::BALANCE_EXTERNAL => Ok(Self::External),
            OrderData::BALANCE_ERC20 => Ok(Self::Erc20),
            _ => Err(anyhow!("Order sellTokenSource is not well defined")),
        }
    }
}

/// Destination for which the buyAmount should be transferred to order's
/// receiver to upon fulfillment
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Deserialize, Serialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuyTokenDestination {
    /// Pay trade proceeds as an ERC20 token transfer
    #[default]
    Erc20,
    /// Pay trade proceeds as a Vault internal balance transfer
    Internal,
}

impl BuyTokenDestination {
    pub fn as_contract_bytes(&self) -> [u8; 32] {
        match self {
            Self::Erc20 => OrderData::BALANCE_ERC20,
            Self::Internal => OrderData::BALANCE_INTERNAL,
        }
    }

    pub fn from_contract_bytes(bytes: [u8; 32]) -> Result<Self> {
        match bytes {
            OrderData::BALANCE_INTERNAL => Ok(Self::Internal),
            OrderData::BALANCE_ERC20 => Ok(Self::Erc20),
            _ => Err(anyhow!("Order buyTokenDestination is not well defined")),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::address,
        serde_json::json,
    };

    fn test_order() -> OrderData {
        OrderData {
            sell_token: address!("0x0101010101010101010101010101010101010101"),
            buy_token: address!("0x0202020202020202020202020202020202020202"),
            receiver: Some(address!("0x0303030303030303030303030303030303030303")),
            sell_amount: U256::from(0x0246ddf97976680000_u128),
            buy_amount: U256::from(0xb98bc829a6f90000_u128),
            valid_to: 0xffffffff,
            app_data: B256::ZERO,
            fee_amount: U256::from(0x0de0b6b3a7640000_u128),
            kind: OrderKind::Sell,
            partially_fillable: false,
            sell_token_balance: SellTokenSource::Erc20,
            buy_token_balance: BuyTokenDestination::Erc20,
        }
    }

    #[test]
    fn type_hash_matches_order_type_string() {
        assert_eq!(
            keccak256(
                "Order(address sellToken,address buyToken,address receiver,\
                 uint256 sellAmount,uint256 buyAmount,uint32 validTo,bytes32 appData,\
                 uint256 feeAmount,string kind,bool partiallyFillable,\
                 string sellTokenBalance,string buyTokenBalance)"
            )
            .0,
            OrderData::TYPE_HASH,
        );
    }

    #[test]
    fn contract_markers_are_hashed_labels() {
        assert_eq!(keccak256("sell").0, OrderKind::SELL);
        assert_eq!(keccak256("buy").0, OrderKind::BUY);
        assert_eq!(keccak256("erc20").0, OrderData::BALANCE_ERC20);
        assert_eq!(keccak256("external").0, OrderData::BALANCE_EXTERNAL);
        assert_eq!(keccak256("internal").0, OrderData::BALANCE_INTERNAL);
    }

    // from the test `should compute order unique identifier` in
    // <https://github.com/cowprotocol/contracts/blob/v1.1.2/test/GPv2Signing.test.ts#L143>
    #[test]
    fn compute_order_uid() {
        let domain_separator = DomainSeparator(hex!(
            "74e0b11bd18120612556bae4578cfd3a254d7e2495f543c569a92ff5794d9b09"
        ));
        let owner = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");
        assert_eq!(
            test_order().uid(&domain_separator, &owner).0,
            hex!(
                "0e45d31fd31b28c26031cdd81b35a8938b2ccca2cc425fcf440fd3bfed1eede9
                 70997970c51812dc3a010c7d01b50e0d17dc79c8
                 ffffffff"
            )
        );
    }

    #[test]
    fn missing_receiver_hashes_as_zero_address() {
        let domain = DomainSeparator([0x42; 32]);
        let order = OrderData {
            receiver: None,
            ..test_order()
        };
        let explicit_zero = OrderData {
            receiver: Some(Address::ZERO),
            ..test_order()
        };
        assert_eq!(order.hash(&domain), explicit_zero.hash(&domain));
        assert_ne!(order.hash(&domain), test_order().hash(&domain));
    }

    #[test]
    fn contract_representation_round_trip() {
        let order = test_order();
        let data = GPv2Order::Data::from(order);
        assert_eq!(data.kind, B256::from(OrderKind::SELL));
        assert_eq!(data.sellTokenBalance, B256::from(OrderData::BALANCE_ERC20));
        assert_eq!(OrderData::try_from(data).unwrap(), order);

        let without_receiver = OrderData {
            receiver: None,
            ..order
        };
        let data = GPv2Order::Data::from(without_receiver);
        assert!(data.receiver.is_zero());
        assert_eq!(OrderData::try_from(data).unwrap().receiver, None);
    }

    #[test]
    fn rejects_unknown_contract_markers() {
        let data = GPv2Order::Data {
            kind: B256::repeat_byte(1),
            ..GPv2Order::Data::from(test_order())
        };
        assert!(OrderData::try_from(data).is_err());
        assert!(SellTokenSource::from_contract_bytes(OrderKind::SELL).is_err());
        assert!(BuyTokenDestination::from_contract_bytes(OrderData::BALANCE_EXTERNAL).is_err());
    }

    #[test]
    fn order_uid_parts() {
        let hash = B256::repeat_byte(0x11);
        let owner = Address::repeat_byte(0x22);
        let uid = OrderUid::from_parts(hash, owner, 0x01020304);
        assert_eq!(&uid.0[52..], &[1, 2, 3, 4]);
        assert_eq!(uid.parts(), (hash, owner, 0x01020304));
    }

    #[test]
    fn order_uid_display_and_parse() {
        let uid = OrderUid([0xab; 56]);
        let displayed = uid.to_string();
        assert_eq!(displayed, format!("0x{}", "ab".repeat(56)));
        assert_eq!(displayed.parse::<OrderUid>().unwrap(), uid);
        assert_eq!("ab".repeat(56).parse::<OrderUid>().unwrap(), uid);
        assert!("0xabab".parse::<OrderUid>().is_err());
        assert_eq!(json!(uid), json!(displayed));
    }

    #[test]
    fn order_creation_serialization() {
        let owner = Address::repeat_byte(0x55);
        let order = OrderCreation {
            data: OrderData {
                sell_token: Address::repeat_byte(0x11),
                buy_token: Address::repeat_byte(0x22),
                receiver: Some(Address::repeat_byte(0x33)),
                sell_amount: U256::from(123),
                buy_amount: U256::from(456),
                valid_to: 1337,
                app_data: B256::repeat_byte(0x44),
                fee_amount: U256::from(789),
                kind: OrderKind::Sell,
                partially_fillable: false,
                sell_token_balance: SellTokenSource::Erc20,
                buy_token_balance: BuyTokenDestination::Erc20,
            },
            from: Some(owner),
            signature: Signature::Eip1271(vec![1, 2, 3]),
        };
        let order_json = json!({
            "sellToken": "0x1111111111111111111111111111111111111111",
            "buyToken": "0x2222222222222222222222222222222222222222",
            "receiver": "0x3333333333333333333333333333333333333333",
            "sellAmount": "123",
            "buyAmount": "456",
            "validTo": 1337,
            "appData": "0x4444444444444444444444444444444444444444444444444444444444444444",
            "feeAmount": "789",
            "kind": "sell",
            "partiallyFillable": false,
            "sellTokenBalance": "erc20",
            "buyTokenBalance": "erc20",
            "signingScheme": "eip1271",
            "signature": "0x010203",
            "from": "0x5555555555555555555555555555555555555555",
        });

        assert_eq!(json!(order), order_json);
        assert_eq!(order, serde_json::from_value(order_json).unwrap());
    }

    #[test]
    fn order_creation_uid_needs_owner() {
        let domain = DomainSeparator([0x01; 32]);
        let mut order = OrderCreation {
            data: test_order(),
            from: None,
            signature: Signature::PreSign,
        };
        assert_eq!(order.uid(&domain), None);

        order.from = Some(Address::repeat_byte(0x05));
        assert_eq!(
            order.uid(&domain),
            Some(test_order().uid(&domain, &Address::repeat_byte(0x05)))
        );
    }
}
