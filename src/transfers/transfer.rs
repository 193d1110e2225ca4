use crate::constants::{InputField, TRANSFER_FROM_FUNCTION_NAME};
use crate::traces::{ClassifiedTrace, TraceAddress, TraceInputError};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A token movement extracted from a `transfer`-classified trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    pub transaction_hash: B256,
    pub trace_address: TraceAddress,
    pub from_address: Address,
    pub to_address: Address,
    pub token_address: Address,
    pub amount: U256,
}

impl Transfer {
    /// Same amount between the same accounts, whatever contract emitted it.
    pub fn is_same_movement(&self, other: &Transfer) -> bool {
        self.from_address == other.from_address && self.to_address == other.to_address && self.amount == other.amount
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("trace {0} is not classified as a transfer")]
    NotATransfer(TraceAddress),
    #[error("trace {trace_address}: {source}")]
    Input {
        trace_address: TraceAddress,
        #[source]
        source: TraceInputError,
    },
}

impl TryFrom<&ClassifiedTrace> for Transfer {
    type Error = TransferError;

    fn try_from(trace: &ClassifiedTrace) -> Result<Self, Self::Error> {
        if !trace.is_transfer() {
            return Err(TransferError::NotATransfer(trace.trace_address.clone()));
        }

        let input_error = |source: TraceInputError| TransferError::Input { trace_address: trace.trace_address.clone(), source };

        let from_address = if trace.function_name.as_deref() == Some(TRANSFER_FROM_FUNCTION_NAME) {
            trace.required_input_address(InputField::SENDER).map_err(input_error)?
        } else {
            trace.from_address
        };
        let to_address = trace.required_input_address(InputField::RECIPIENT).map_err(input_error)?;
        let amount = trace.required_input_amount(InputField::AMOUNT).map_err(input_error)?;

        Ok(Transfer {
            transaction_hash: trace.transaction_hash,
            trace_address: trace.trace_address.clone(),
            from_address,
            to_address,
            token_address: trace.to_address,
            amount,
        })
    }
}
