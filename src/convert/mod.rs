pub mod codec;
pub mod gateway;

pub use codec::{ImageEncoder, WebpEncoder, WebpOptions};
pub use gateway::{ConversionGateway, ConversionRequest, ConversionResult};
