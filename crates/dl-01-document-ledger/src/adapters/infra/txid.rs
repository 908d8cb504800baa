use crate::domain::value_objects::{TxId, TX_ID_PREFIX};
use crate::ports::outbound::TxIdGenerator;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per id (128 bits).
pub const TX_ID_ENTROPY_BYTES: usize = 16;

/// Mints `tx_` + 32 lowercase hex characters from the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTxIdGenerator;

impl TxIdGenerator for RandomTxIdGenerator {
    fn new_id(&self) -> TxId {
        let mut bytes = [0u8; TX_ID_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        TxId::new(format!("{}{}", TX_ID_PREFIX, hex::encode(bytes)))
    }
}
