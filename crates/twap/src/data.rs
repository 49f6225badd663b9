//! The terms of a TWAP order and the signature that authorizes its parts.

use {
    alloy::{
        primitives::{Address, B256, U256},
        sol_types::SolValue,
    },
    contracts::TWAPOrder,
    model::order::{BuyTokenDestination, OrderData, OrderKind, SellTokenSource},
};

/// Terms shared by every part of a TWAP order. Amounts are per part.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TwapData {
    pub sell_token: Address,
    pub buy_token: Address,
    /// `None` pays the proceeds to the order owner.
    pub receiver: Option<Address>,
    pub sell_amount: U256,
    pub buy_amount: U256,
    pub valid_to: u32,
    pub fee_amount: U256,
}

impl TwapData {
    /// Substitutes a missing receiver with `owner`. The zero address counts
    /// as missing.
    pub fn with_owner(self, owner: Address) -> Self {
        let receiver = match self.receiver {
            Some(receiver) if !receiver.is_zero() => receiver,
            _ => owner,
        };
        Self {
            receiver: Some(receiver),
            ..self
        }
    }

    /// The settlement order for a single part. Parts are fill-or-kill sell
    /// orders that carry their index as app data.
    pub fn order(&self, part: U256, owner: Address) -> OrderData {
        let data = self.with_owner(owner);
        OrderData {
            sell_token: data.sell_token,
            buy_token: data.buy_token,
            receiver: data.receiver,
            sell_amount: data.sell_amount,
            buy_amount: data.buy_amount,
            valid_to: data.valid_to,
            app_data: B256::from(part.to_be_bytes::<32>()),
            fee_amount: data.fee_amount,
            kind: OrderKind::Sell,
            partially_fillable: false,
            sell_token_balance: SellTokenSource::Erc20,
            buy_token_balance: BuyTokenDestination::Erc20,
        }
    }

    /// Total amount of sell token needed to fund `parts` parts, or `None` on
    /// overflow.
    pub fn escrow(&self, parts: u32) -> Option<U256> {
        self.sell_amount
            .checked_add(self.fee_amount)?
            .checked_mul(U256::from(parts))
    }
}

impl From<TwapData> for TWAPOrder::Data {
    fn from(data: TwapData) -> Self {
        Self {
            sellToken: data.sell_token,
            buyToken: data.buy_token,
            receiver: data.receiver.unwrap_or_default(),
            sellAmount: data.sell_amount,
            buyAmount: data.buy_amount,
            validTo: data.valid_to,
            feeAmount: data.fee_amount,
        }
    }
}

impl From<TWAPOrder::Data> for TwapData {
    fn from(data: TWAPOrder::Data) -> Self {
        Self {
            sell_token: data.sellToken,
            buy_token: data.buyToken,
            receiver: (!data.receiver.is_zero()).then_some(data.receiver),
            sell_amount: data.sellAmount,
            buy_amount: data.buyAmount,
            valid_to: data.validTo,
            fee_amount: data.feeAmount,
        }
    }
}

/// The EIP-1271 signature of a part: `abi.encode(uint256 part, data)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartSignature {
    pub part: U256,
    pub data: TwapData,
}

impl PartSignature {
    pub fn encode(&self) -> Vec<u8> {
        (self.part, TWAPOrder::Data::from(self.data)).abi_encode_params()
    }

    pub fn decode(signature: &[u8]) -> Result<Self, alloy::sol_types::Error> {
        let (part, data) = <(U256, TWAPOrder::Data)>::abi_decode_params(signature)?;
        Ok(Self {
            part,
            data: data.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, hex_literal::hex};

    fn data() -> TwapData {
        TwapData {
            sell_token: Address::repeat_byte(0x01),
            buy_token: Address::repeat_byte(0x02),
            receiver: None,
            sell_amount: U256::from(1_000),
            buy_amount: U256::from(2_000),
            valid_to: 0x12345678,
            fee_amount: U256::from(10),
        }
    }

    #[test]
    fn missing_receiver_is_substituted() {
        let owner = Address::repeat_byte(0x0a);
        assert_eq!(data().with_owner(owner).receiver, Some(owner));

        let zero = TwapData {
            receiver: Some(Address::ZERO),
            ..data()
        };
        assert_eq!(zero.with_owner(owner).receiver, Some(owner));

        let explicit = TwapData {
            receiver: Some(Address::repeat_byte(0x0b)),
            ..data()
        };
        assert_eq!(
            explicit.with_owner(owner).receiver,
            Some(Address::repeat_byte(0x0b))
        );
    }

    #[test]
    fn part_orders_are_fill_or_kill_sells() {
        let owner = Address::repeat_byte(0x0a);
        let order = data().order(U256::from(3), owner);

        assert_eq!(order.kind, OrderKind::Sell);
        assert!(!order.partially_fillable);
        assert_eq!(order.sell_token_balance, SellTokenSource::Erc20);
        assert_eq!(order.buy_token_balance, BuyTokenDestination::Erc20);
        assert_eq!(order.receiver, Some(owner));
        assert_eq!(order.sell_amount, U256::from(1_000));
        assert_eq!(order.fee_amount, U256::from(10));
        assert_eq!(order.valid_to, 0x12345678);
        assert_eq!(
            order.app_data,
            B256::from(hex!(
                "0000000000000000000000000000000000000000000000000000000000000003"
            ))
        );
    }

    #[test]
    fn escrow_covers_sell_and_fee_amounts() {
        assert_eq!(data().escrow(30), Some(U256::from(30_300)));
        assert_eq!(data().escrow(0), Some(U256::ZERO));

        let huge = TwapData {
            sell_amount: U256::MAX,
            fee_amount: U256::from(1),
            ..data()
        };
        assert_eq!(huge.escrow(1), None);

        let large = TwapData {
            sell_amount: U256::MAX / U256::from(2),
            fee_amount: U256::ZERO,
            ..data()
        };
        assert_eq!(large.escrow(3), None);
    }

    #[test]
    fn part_signature_layout() {
        let signature = PartSignature {
            part: U256::from(7),
            data: data().with_owner(Address::repeat_byte(0x0a)),
        };
        let encoded = signature.encode();

        assert_eq!(encoded.len(), 8 * 32);
        assert_eq!(&encoded[..32], B256::with_last_byte(7).as_slice());
        assert_eq!(&encoded[32 + 12..64], Address::repeat_byte(0x01).as_slice());
        assert_eq!(&encoded[96 + 12..128], Address::repeat_byte(0x0a).as_slice());
        assert_eq!(PartSignature::decode(&encoded).unwrap(), signature);
    }

    #[test]
    fn short_signatures_are_malformed() {
        let encoded = PartSignature {
            part: U256::ZERO,
            data: data(),
        }
        .encode();
        assert!(PartSignature::decode(&encoded[..255]).is_err());
        assert!(PartSignature::decode(&[]).is_err());
    }
}
