use super::rules::Direction;
use super::{split_fields, strip_comment};
use crate::core::error::{SimError, SimResult};
use crate::network::{parse_ip, parse_port};

/// パケット記述1行分。元の文字列フィールドも結果出力のために保持する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallPacket {
    pub direction: Direction,
    pub ip: u32,
    pub port: u16,
    pub established: bool,
    pub source_line: usize,
    pub raw: RawFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub direction: String,
    pub ip: String,
    pub port: String,
    pub flag: String,
}

impl FirewallPacket {
    /// 1行をパケットに変換する。空行・コメント行は `Ok(None)`
    pub fn parse(line_text: &str, line_no: usize, file_name: &str) -> SimResult<Option<Self>> {
        let content = strip_comment(line_text);
        if content.is_empty() {
            return Ok(None);
        }

        let err = |reason: String| SimError::packet_syntax(file_name, line_no, reason);

        let fields = split_fields(content);
        let [direction, ip, port, flag] = fields[..] else {
            return Err(err("packet needs 4 fields".to_string()));
        };

        let parsed_direction = direction.parse::<Direction>().map_err(err)?;
        let parsed_ip = parse_ip(ip).map_err(|e| err(e.to_string()))?;
        let parsed_port = parse_port(port).map_err(|e| err(e.to_string()))?;
        let established = match flag {
            "0" => false,
            "1" => true,
            other => {
                return Err(err(format!(
                    "invalid flag '{}', expected '0' or '1'",
                    other
                )))
            }
        };

        Ok(Some(FirewallPacket {
            direction: parsed_direction,
            ip: parsed_ip,
            port: parsed_port,
            established,
            source_line: line_no,
            raw: RawFields {
                direction: direction.to_string(),
                ip: ip.to_string(),
                port: port.to_string(),
                flag: flag.to_string(),
            },
        }))
    }
}

pub fn parse_packets<S: AsRef<str>>(lines: &[S], file_name: &str) -> SimResult<Vec<FirewallPacket>> {
    let mut packets = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(packet) = FirewallPacket::parse(line.as_ref(), idx + 1, file_name)? {
            packets.push(packet);
        }
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason_of(line: &str) -> String {
        match FirewallPacket::parse(line, 4, "packets.txt") {
            Err(SimError::PacketSyntax { file, line, reason }) => {
                assert_eq!(file, "packets.txt");
                assert_eq!(line, 4);
                reason
            }
            other => panic!("パケットエラーを期待しましたが {:?} でした", other),
        }
    }

    #[test]
    fn test_parse_packet() {
        let packet = FirewallPacket::parse("in 10.0.0.5 80 1", 2, "p").unwrap().unwrap();
        assert_eq!(packet.direction, Direction::In);
        assert_eq!(packet.ip, 0x0A00_0005);
        assert_eq!(packet.port, 80);
        assert!(packet.established);
        assert_eq!(packet.source_line, 2);
    }

    #[test]
    fn test_raw_fields_are_verbatim() {
        let packet = FirewallPacket::parse("  out\t010.000.000.001   0080 0  # note", 1, "p")
            .unwrap()
            .unwrap();
        assert_eq!(packet.raw.direction, "out");
        assert_eq!(packet.raw.ip, "010.000.000.001");
        assert_eq!(packet.raw.port, "0080");
        assert_eq!(packet.raw.flag, "0");
        assert_eq!(packet.port, 80);
    }

    #[test]
    fn test_blank_and_comment_lines_yield_nothing() {
        assert!(FirewallPacket::parse("", 1, "p").unwrap().is_none());
        assert!(FirewallPacket::parse("# in 1.2.3.4 80 0", 1, "p").unwrap().is_none());
    }

    #[test]
    fn test_non_ascii_whitespace_does_not_separate_fields() {
        assert_eq!(reason_of("in\u{3000}1.2.3.4 80 0"), "packet needs 4 fields");
        assert_eq!(
            reason_of("in 1.2.3.4\u{00A0} 80 0"),
            "invalid ip address '1.2.3.4\u{a0}'"
        );
    }

    #[test]
    fn test_each_failure_has_its_own_reason() {
        assert_eq!(reason_of("in 1.2.3.4 80"), "packet needs 4 fields");
        assert_eq!(reason_of("in 1.2.3.4 80 0 extra"), "packet needs 4 fields");
        assert_eq!(reason_of("sideways 1.2.3.4 80 0"), "invalid direction 'sideways'");
        assert_eq!(reason_of("in 1.2.3.999 80 0"), "invalid ip address '1.2.3.999'");
        assert_eq!(reason_of("in * 80 0"), "invalid ip address '*'");
        assert_eq!(reason_of("in 1.2.3.0/24 80 0"), "invalid ip address '1.2.3.0/24'");
        assert_eq!(reason_of("in 1.2.3.4 65536 0"), "invalid port '65536'");
        assert_eq!(reason_of("in 1.2.3.4 80,81 0"), "invalid port '80,81'");
        assert_eq!(reason_of("in 1.2.3.4 80 2"), "invalid flag '2', expected '0' or '1'");
    }
}
