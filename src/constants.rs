pub const UNISWAP_V2_PAIR_ABI_NAME: &str = "UniswapV2Pair";

pub const UNISWAP_V3_POOL_ABI_NAME: &str = "UniswapV3Pool";

#[non_exhaustive]
pub struct InputField;

impl InputField {
    // UniswapV2Pair.swap(amount0Out, amount1Out, to, data)
    pub const TO: &'static str = "to";
    // UniswapV3Pool.swap(recipient, ...) and ERC20 transfer/transferFrom
    pub const RECIPIENT: &'static str = "recipient";
    // ERC20 transferFrom(sender, recipient, amount)
    pub const SENDER: &'static str = "sender";
    pub const AMOUNT: &'static str = "amount";
}

pub const TRANSFER_FROM_FUNCTION_NAME: &str = "transferFrom";
