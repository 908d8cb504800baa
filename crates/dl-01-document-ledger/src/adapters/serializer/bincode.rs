use crate::domain::entities::{DocumentRecord, SealedRecord};
use crate::domain::errors::CodecError;
use crate::ports::outbound::RecordCodec;

/// Default record codec: bincode body sealed with a CRC32 of that body.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeRecordCodec;

impl BincodeRecordCodec {
    fn checksum(record: &DocumentRecord) -> Result<u32, CodecError> {
        let body = bincode::serialize(record).map_err(|e| CodecError::Encode {
            message: e.to_string(),
        })?;
        Ok(crc32fast::hash(&body))
    }
}

impl RecordCodec for BincodeRecordCodec {
    fn encode(&self, record: &DocumentRecord) -> Result<Vec<u8>, CodecError> {
        let sealed = SealedRecord {
            record: record.clone(),
            checksum: Self::checksum(record)?,
        };
        bincode::serialize(&sealed).map_err(|e| CodecError::Encode {
            message: e.to_string(),
        })
    }

    fn decode(&self, data: &[u8]) -> Result<DocumentRecord, CodecError> {
        let sealed: SealedRecord = bincode::deserialize(data).map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        let actual = Self::checksum(&sealed.record)?;
        if actual != sealed.checksum {
            return Err(CodecError::ChecksumMismatch {
                expected: sealed.checksum,
                actual,
            });
        }
        Ok(sealed.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RecordStatus;
    use crate::domain::value_objects::{ContentDigest, TxId};
    use shared_types::PrincipalId;

    fn record() -> DocumentRecord {
        DocumentRecord {
            id: TxId::new("tx_00"),
            digest: ContentDigest([9; 32]),
            sequence_number: 1,
            file_name: "deed.pdf".into(),
            file_size_bytes: 1234,
            content_type: "application/pdf".into(),
            title: "Deed".into(),
            description: "land deed".into(),
            submitter_id: PrincipalId::new("u1"),
            submitted_at: 42,
            status: RecordStatus::Pending,
            review: None,
        }
    }

    #[test]
    fn test_decode_returns_sealed_record() {
        let codec = BincodeRecordCodec;
        let bytes = codec.encode(&record()).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), record());
    }

    #[test]
    fn test_tampered_record_fails_checksum() {
        let codec = BincodeRecordCodec;
        let sealed = SealedRecord {
            record: DocumentRecord {
                title: "Forged".into(),
                ..record()
            },
            checksum: BincodeRecordCodec::checksum(&record()).unwrap(),
        };
        let bytes = bincode::serialize(&sealed).unwrap();

        let err = codec.decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = BincodeRecordCodec.decode(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }
}
