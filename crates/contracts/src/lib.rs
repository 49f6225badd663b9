//! Solidity interfaces of the contracts that TWAP orders interact with, and
//! the well-known deployments of the settlement contract.

pub mod deployments;

alloy::sol! {
    library GPv2Order {
        /// Order data exactly as it is hashed and settled by the GPv2
        /// settlement contract.
        ///
        /// See <https://github.com/cowprotocol/contracts/blob/v1.1.2/src/contracts/libraries/GPv2Order.sol#L11>
        #[derive(Debug, Default, PartialEq, Eq)]
        struct Data {
            address sellToken;
            address buyToken;
            address receiver;
            uint256 sellAmount;
            uint256 buyAmount;
            uint32 validTo;
            bytes32 appData;
            uint256 feeAmount;
            bytes32 kind;
            bool partiallyFillable;
            bytes32 sellTokenBalance;
            bytes32 buyTokenBalance;
        }
    }

    library TWAPOrder {
        /// Terms shared by every part of a TWAP order.
        #[derive(Debug, Default, PartialEq, Eq)]
        struct Data {
            address sellToken;
            address buyToken;
            address receiver;
            uint256 sellAmount;
            uint256 buyAmount;
            uint32 validTo;
            uint256 feeAmount;
        }
    }

    interface ICoWSwapOnchainOrders {
        /// `scheme` is the `OnchainSigningScheme` enum (`Eip1271 = 0`,
        /// `PreSign = 1`).
        #[derive(Debug, Default, PartialEq, Eq)]
        struct OnchainSignature {
            uint8 scheme;
            bytes data;
        }

        event OrderPlacement(
            address indexed sender,
            GPv2Order.Data order,
            OnchainSignature signature,
            bytes data
        );
    }

    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }

    interface IERC1271 {
        function isValidSignature(bytes32 hash, bytes signature) external view returns (bytes4 magicValue);
    }
}

/// Value returned by `isValidSignature` when a signature is accepted. It is
/// the selector of the `isValidSignature(bytes32,bytes)` function.
pub const ERC1271_MAGIC_VALUE: [u8; 4] =
    <IERC1271::isValidSignatureCall as alloy_sol_types::SolCall>::SELECTOR;

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Address, B256, Bytes, U256, keccak256},
            sol_types::{SolEvent, SolValue},
        },
        hex_literal::hex,
    };

    #[test]
    fn erc1271_magic_value() {
        assert_eq!(ERC1271_MAGIC_VALUE, hex!("1626ba7e"));
    }

    #[test]
    fn order_placement_signature() {
        assert_eq!(
            ICoWSwapOnchainOrders::OrderPlacement::SIGNATURE_HASH,
            keccak256(
                "OrderPlacement(address,(address,address,address,uint256,uint256,uint32,bytes32,\
                 uint256,bytes32,bool,bytes32,bytes32),(uint8,bytes),bytes)"
            ),
        );
    }

    #[test]
    fn twap_data_is_encoded_as_static_tuple() {
        let data = TWAPOrder::Data {
            sellToken: Address::repeat_byte(0x01),
            buyToken: Address::repeat_byte(0x02),
            receiver: Address::repeat_byte(0x03),
            sellAmount: U256::from(4),
            buyAmount: U256::from(5),
            validTo: 6,
            feeAmount: U256::from(7),
        };

        let encoded = data.abi_encode();
        assert_eq!(encoded.len(), 7 * 32);
        assert_eq!(&encoded[12..32], Address::repeat_byte(0x01).as_slice());
        assert_eq!(&encoded[160..192], B256::left_padding_from(&[6]).as_slice());
        assert_eq!(TWAPOrder::Data::abi_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn onchain_signature_round_trips_through_events() {
        let event = ICoWSwapOnchainOrders::OrderPlacement {
            sender: Address::repeat_byte(0x42),
            order: GPv2Order::Data::default(),
            signature: ICoWSwapOnchainOrders::OnchainSignature {
                scheme: 0,
                data: Bytes::from_static(&[1, 2, 3]),
            },
            data: Bytes::new(),
        };

        let log = event.encode_log_data();
        assert_eq!(log.topics().len(), 2);

        let decoded = ICoWSwapOnchainOrders::OrderPlacement::decode_log_data(&log).unwrap();
        assert_eq!(decoded.sender, event.sender);
        assert_eq!(decoded.signature, event.signature);
        assert_eq!(decoded.order, event.order);
    }
}
