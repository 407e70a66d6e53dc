//! Request/response correlation
//!
//! Pairs each Job frame with its later acknowledgment-with-data frame using
//! the 16-bit PDU reference, resolving the addressed variable at request
//! time and decoding carried values with the variable's declared type.
//!
//! PDU references are only unique within one connection and one in-flight
//! window: a reference reused before the prior entry was consumed overwrites
//! it, matching wire behavior.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::capture::RawFrame;
use crate::decode::{decode_hex, Value};
use crate::index::{AddressIndex, VariableDescriptor};
use crate::protocol::{Function, ItemResponse, MemoryArea, Rosctr, TransportSize};

/// Per-frame output of the correlation engine
///
/// Exactly one record is emitted for every input frame. Fields a frame does
/// not carry, and variables or values that could not be resolved, are `None`
/// and render as "Unknown" downstream.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub number: u64,
    pub time: String,
    pub time_epoch: String,
    pub time_relative: String,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub length: Option<u32>,
    pub rosctr: Option<Rosctr>,
    pub pdu_ref: Option<u16>,
    pub function: Option<Function>,
    pub item_count: Option<u8>,
    pub transport_size: Option<TransportSize>,
    pub item_length: Option<u16>,
    pub db_number: Option<u16>,
    pub area: Option<MemoryArea>,
    pub address_byte: Option<u32>,
    pub address_bit: Option<u8>,
    pub variable: Option<VariableDescriptor>,
    pub value: Option<Value>,
    pub return_code: Option<ItemResponse>,
}

/// Running counters reported at the end of a run
#[derive(Debug, Default, Clone, Copy)]
pub struct EngineStats {
    /// Frames processed (one record each)
    pub frames: usize,
    /// Job and acknowledgment-with-data frames whose variable lookup missed
    pub unresolved: usize,
    /// Payloads that failed to decode
    pub decode_failures: usize,
}

/// Correlation engine for one capture run
///
/// Owns the pending-transaction map; construct a fresh engine per capture.
pub struct CorrelationEngine<'a> {
    index: &'a AddressIndex,
    /// Pending Job entries keyed by PDU reference; `None` marks a request
    /// whose address did not resolve.
    pending: HashMap<u16, Option<VariableDescriptor>>,
    stats: EngineStats,
}

impl<'a> CorrelationEngine<'a> {
    pub fn new(index: &'a AddressIndex) -> Self {
        CorrelationEngine {
            index,
            pending: HashMap::new(),
            stats: EngineStats::default(),
        }
    }

    /// Process one frame, in capture order, and emit its record
    pub fn process(&mut self, frame: &RawFrame) -> FrameRecord {
        self.stats.frames += 1;

        let rosctr = frame.rosctr.map(Rosctr::from);
        let function = frame.function.map(Function::from);
        let area = frame.area.map(MemoryArea::from);

        // The item address field is a bit offset from the area start
        let address_byte = frame.bit_offset.map(|offset| offset / 8);
        let address_bit = frame.bit_offset.map(|offset| (offset % 8) as u8);

        let mut variable: Option<VariableDescriptor> = None;
        let mut value: Option<Value> = None;

        match rosctr {
            Some(Rosctr::Job) => {
                if let (Some(dst), Some(byte), Some(bit), Some(area)) =
                    (frame.dst_ip.as_deref(), address_byte, address_bit, area)
                {
                    variable = self.index.resolve(dst, byte, bit, area).cloned();
                }
                if variable.is_none() {
                    self.stats.unresolved += 1;
                }

                if let Some(reference) = frame.pdu_ref {
                    // Reference reuse before acknowledgment overwrites the
                    // prior entry
                    if self.pending.insert(reference, variable.clone()).is_some() {
                        debug!(
                            "frame {}: PDU reference {} reused before acknowledgment",
                            frame.number, reference
                        );
                    }
                }

                // Write requests carry their data inline; decode with the
                // type resolved from the request's own address
                if function == Some(Function::Write) {
                    value = self.decode_payload(frame, variable.as_ref());
                }
            },
            Some(Rosctr::AckData) => {
                match frame.pdu_ref.and_then(|r| self.pending.remove(&r)) {
                    Some(entry) => variable = entry,
                    // Legitimate at the start of a capture that begins
                    // mid-connection
                    None => debug!(
                        "frame {}: no matching request observed for reference {:?}",
                        frame.number, frame.pdu_ref
                    ),
                }
                if variable.is_none() {
                    self.stats.unresolved += 1;
                }

                if function == Some(Function::Read) {
                    value = self.decode_payload(frame, variable.as_ref());
                }
            },
            // Plain acknowledgments and unrecognized roles pass through
            // with variable and value unresolved; they are not lookup
            // misses, so the unresolved counter is untouched
            _ => {},
        }

        FrameRecord {
            number: frame.number,
            time: frame.time.clone(),
            time_epoch: frame.time_epoch.clone(),
            time_relative: frame.time_relative.clone(),
            src_ip: frame.src_ip.clone(),
            dst_ip: frame.dst_ip.clone(),
            length: frame.length,
            rosctr,
            pdu_ref: frame.pdu_ref,
            function,
            item_count: frame.item_count,
            transport_size: frame.transport_size.map(TransportSize::from),
            item_length: frame.item_length,
            db_number: frame.db_number,
            area,
            address_byte,
            address_bit,
            variable,
            value,
            return_code: frame.return_code.map(ItemResponse::from),
        }
    }

    /// Decode a frame payload with the resolved variable's declared type
    ///
    /// Soft failure: a miss or malformed payload yields `None` and the run
    /// continues.
    fn decode_payload(
        &mut self,
        frame: &RawFrame,
        variable: Option<&VariableDescriptor>,
    ) -> Option<Value> {
        let variable = variable?;
        let payload = frame.payload.as_deref()?;
        match decode_hex(payload, variable.var_type, 0) {
            Ok(value) => Some(value),
            Err(e) => {
                self.stats.decode_failures += 1;
                warn!(
                    "frame {}: failed to decode {} payload for {:?}: {}",
                    frame.number, variable.var_type, variable.name, e
                );
                None
            },
        }
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Requests still awaiting an acknowledgment
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MappingDocument;

    fn index() -> AddressIndex {
        let doc: MappingDocument = serde_yaml::from_str(
            r#"
plc:
  - ip: 10.0.0.1
    io_mapping:
      data_block:
        - number: 1
          variables:
            - { address: "2.0", name: SetPoint, type: INT }
            - { address: "6.0", name: TankLevel, type: REAL }
      output:
        - { address: "0.3", name: PumpRunning, type: BOOL }
"#,
        )
        .unwrap();
        AddressIndex::build(&doc).unwrap()
    }

    fn job_read(number: u64, pdu_ref: u16, bit_offset: u32) -> RawFrame {
        RawFrame {
            number,
            dst_ip: Some("10.0.0.1".to_string()),
            src_ip: Some("10.0.0.50".to_string()),
            rosctr: Some(0x01),
            function: Some(0x04),
            pdu_ref: Some(pdu_ref),
            area: Some(0x84),
            db_number: Some(1),
            bit_offset: Some(bit_offset),
            ..RawFrame::default()
        }
    }

    fn ack_data(number: u64, pdu_ref: u16, payload: &str) -> RawFrame {
        RawFrame {
            number,
            src_ip: Some("10.0.0.1".to_string()),
            dst_ip: Some("10.0.0.50".to_string()),
            rosctr: Some(0x03),
            function: Some(0x04),
            pdu_ref: Some(pdu_ref),
            return_code: Some(0xFF),
            payload: Some(payload.to_string()),
            ..RawFrame::default()
        }
    }

    #[test]
    fn test_job_resolves_and_ack_correlates() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        let job = engine.process(&job_read(1, 7, 16));
        assert_eq!(job.variable.as_ref().unwrap().name, "SetPoint");
        assert_eq!(job.value, None);
        assert_eq!(engine.pending_count(), 1);

        let ack = engine.process(&ack_data(2, 7, "00:32"));
        assert_eq!(ack.variable.as_ref().unwrap().name, "SetPoint");
        assert_eq!(ack.value, Some(Value::Int(50)));
        assert_eq!(ack.return_code, Some(ItemResponse::Success));
        assert_eq!(engine.pending_count(), 0);
    }

    #[test]
    fn test_reference_reuse_overwrites_pending_entry() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        // SetPoint at 2.0, then TankLevel at 6.0, both under reference 9
        engine.process(&job_read(1, 9, 16));
        engine.process(&job_read(2, 9, 48));
        assert_eq!(engine.pending_count(), 1);

        let ack = engine.process(&ack_data(3, 9, "41:c8:00:00"));
        assert_eq!(ack.variable.as_ref().unwrap().name, "TankLevel");
        assert_eq!(ack.value, Some(Value::Real(25.0)));
    }

    #[test]
    fn test_ack_without_request_is_unresolved() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        let ack = engine.process(&ack_data(1, 123, "00:05"));
        assert!(ack.variable.is_none());
        assert!(ack.value.is_none());

        // Subsequent frames are unaffected
        let job = engine.process(&job_read(2, 7, 16));
        assert_eq!(job.variable.as_ref().unwrap().name, "SetPoint");
    }

    #[test]
    fn test_write_job_decodes_inline_payload() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        let frame = RawFrame {
            function: Some(0x05),
            payload: Some("00:64".to_string()),
            ..job_read(1, 3, 16)
        };
        let record = engine.process(&frame);
        assert_eq!(record.variable.as_ref().unwrap().name, "SetPoint");
        assert_eq!(record.value, Some(Value::Int(100)));
    }

    #[test]
    fn test_resolution_miss_is_soft() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        // Byte 50.0 is not configured anywhere
        let record = engine.process(&job_read(1, 4, 400));
        assert!(record.variable.is_none());

        // The miss is remembered: the acknowledgment is also unresolved
        let ack = engine.process(&ack_data(2, 4, "00:01"));
        assert!(ack.variable.is_none());
        assert!(ack.value.is_none());
        assert_eq!(engine.stats().frames, 2);
        assert_eq!(engine.stats().unresolved, 2);
    }

    #[test]
    fn test_malformed_payload_is_soft_failure() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        engine.process(&job_read(1, 5, 16));
        let ack = engine.process(&ack_data(2, 5, "not-hex"));
        assert_eq!(ack.variable.as_ref().unwrap().name, "SetPoint");
        assert!(ack.value.is_none());
        assert_eq!(engine.stats().decode_failures, 1);
    }

    #[test]
    fn test_plain_ack_passes_through_unresolved() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        engine.process(&job_read(1, 6, 16));
        let ack = engine.process(&RawFrame {
            number: 2,
            rosctr: Some(0x02),
            pdu_ref: Some(6),
            ..RawFrame::default()
        });
        assert!(ack.variable.is_none());
        // A plain acknowledgment does not consume the pending entry
        assert_eq!(engine.pending_count(), 1);
    }

    #[test]
    fn test_unrecognized_role_emits_record() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        let record = engine.process(&RawFrame {
            number: 1,
            rosctr: Some(0x99),
            ..RawFrame::default()
        });
        assert_eq!(record.rosctr, Some(Rosctr::Unknown(0x99)));
        assert!(record.variable.is_none());
        assert_eq!(engine.stats().frames, 1);
    }

    #[test]
    fn test_unresolved_counts_only_lookup_misses() {
        let index = index();
        let mut engine = CorrelationEngine::new(&index);

        // Plain ack, unrecognized role, frame without a ROSCTR: none of
        // these perform a lookup
        engine.process(&RawFrame {
            number: 1,
            rosctr: Some(0x02),
            pdu_ref: Some(1),
            ..RawFrame::default()
        });
        engine.process(&RawFrame {
            number: 2,
            rosctr: Some(0x99),
            ..RawFrame::default()
        });
        engine.process(&RawFrame {
            number: 3,
            ..RawFrame::default()
        });
        assert_eq!(engine.stats().unresolved, 0);

        // A resolving Job does not count, a missing one does
        engine.process(&job_read(4, 2, 16));
        engine.process(&job_read(5, 3, 400));
        assert_eq!(engine.stats().unresolved, 1);

        // An acknowledgment with no matching request is a miss too
        engine.process(&ack_data(6, 77, "00:01"));
        assert_eq!(engine.stats().unresolved, 2);
        assert_eq!(engine.stats().frames, 6);
    }
}
