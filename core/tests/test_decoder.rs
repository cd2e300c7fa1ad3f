// * ✅ unmarshal of hand-compressed JSON (open-ended and fixed shapes)
// * ✅ decode_into keeps the destination on failure
// * ✅ one gzip member per decode call, in order
// * ✅ source left positioned after the member
// * ✅ a value never spans two members

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{self, Cursor, Read, Write};
    use std::rc::Rc;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use gzjson_core::{
        unmarshal, unmarshal_into, unmarshal_with, Decoder, Encoder, PipelineConfig, PipelineMode,
        StreamError,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Gopher {
        #[serde(rename = "ID")]
        id: i64,
        #[serde(rename = "Name")]
        name: String,
    }

    /// Reads from an `Rc` buffer, so it is not `Send`.
    struct RcReader {
        data: Rc<Vec<u8>>,
        pos: usize,
    }

    impl Read for RcReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let rest = &self.data[self.pos..];
            let n = rest.len().min(buf.len());
            buf[..n].copy_from_slice(&rest[..n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn gzip(text: &[u8]) -> Vec<u8> {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text).unwrap();
        enc.finish().unwrap()
    }

    fn modes() -> [PipelineConfig; 2] {
        [
            PipelineConfig::inline(),
            PipelineConfig::threaded().with_pipe_capacity(1).with_chunk_size(64),
        ]
    }

    #[test]
    fn unmarshal_into_open_ended_map() {
        let bytes = gzip(br#"{"foo": "bar"}"#);

        let value: Value = unmarshal(&bytes).unwrap();
        assert_eq!(value, json!({"foo": "bar"}));

        let map: HashMap<String, String> = unmarshal(&bytes).unwrap();
        assert_eq!(map.get("foo").map(String::as_str), Some("bar"));
    }

    #[test]
    fn unmarshal_into_record() {
        let bytes = gzip(br#"{"ID": 99, "Name": "gopher"}"#);

        for config in modes() {
            let gopher: Gopher = unmarshal_with(&bytes, config).unwrap();
            assert_eq!(gopher, Gopher { id: 99, name: "gopher".into() });
        }
    }

    #[test]
    fn unmarshal_without_trailing_newline() {
        let bytes = gzip(b"[1,2,3]");
        let list: Vec<u8> = unmarshal(&bytes).unwrap();
        assert_eq!(list, vec![1, 2, 3]);
    }

    #[test]
    fn unmarshal_into_overwrites_destination() {
        let bytes = gzip(br#"["foo","bar"]"#);
        let mut dest = vec!["old".to_string()];

        unmarshal_into(&bytes, &mut dest).unwrap();
        assert_eq!(dest, vec!["foo", "bar"]);
    }

    #[test]
    fn decode_into_leaves_destination_on_error() {
        let bytes = gzip(br#"{"foo": "bar"}"#);
        let mut dest = vec!["keep".to_string()];

        let mut decoder = Decoder::new(Cursor::new(bytes));
        let err = decoder.decode_into(&mut dest).unwrap_err();

        assert!(matches!(err, StreamError::Deserialization(_)));
        assert_eq!(dest, vec!["keep"]);
    }

    #[test]
    fn sequential_members_decode_in_order() {
        for config in modes() {
            let mut encoder = Encoder::with_config(Vec::new(), config.clone());
            encoder.encode(&json!({"n": 1})).unwrap();
            encoder.encode(&"two").unwrap();
            encoder.encode(&[3, 3, 3]).unwrap();
            let stream = encoder.into_inner();

            let mut decoder = Decoder::with_config(Cursor::new(stream), config);
            assert_eq!(decoder.decode::<Value>().unwrap(), json!({"n": 1}));
            assert!(!decoder.is_exhausted().unwrap());
            assert_eq!(decoder.decode::<String>().unwrap(), "two");
            assert_eq!(decoder.decode::<Vec<i32>>().unwrap(), vec![3, 3, 3]);
            assert!(decoder.is_exhausted().unwrap());
        }
    }

    #[test]
    fn decode_past_last_member_is_invalid_format() {
        let mut decoder = Decoder::new(Cursor::new(gzip(b"1")));
        assert_eq!(decoder.decode::<u8>().unwrap(), 1);

        let err = decoder.decode::<u8>().unwrap_err();
        assert!(matches!(err, StreamError::InvalidCompressedFormat(_)));
    }

    #[test]
    fn trailing_bytes_after_member_are_not_consumed() {
        let mut stream = gzip(br#""value""#);
        stream.extend_from_slice(b"tail");

        let mut decoder = Decoder::new(Cursor::new(stream));
        assert_eq!(decoder.decode::<String>().unwrap(), "value");
        assert!(!decoder.is_exhausted().unwrap());

        // The tail is still there for the next call, and it is not gzip.
        let err = decoder.decode::<String>().unwrap_err();
        assert!(matches!(err, StreamError::InvalidCompressedFormat(_)), "got {err:?}");
    }

    #[test]
    fn value_split_across_members_is_not_joined() {
        let mut stream = gzip(br#"{"foo":"#);
        stream.extend_from_slice(&gzip(br#""bar"}"#));

        for config in modes() {
            let mut decoder = Decoder::with_config(Cursor::new(stream.clone()), config);
            let err = decoder.decode::<Value>().unwrap_err();
            assert!(matches!(err, StreamError::Deserialization(_)), "got {err:?}");
        }
    }

    #[test]
    fn inline_decode_accepts_non_send_source() {
        let mut stream = gzip(br#"{"foo":"bar"}"#);
        stream.extend_from_slice(&gzip(b"[1,2]"));
        let source = RcReader { data: Rc::new(stream), pos: 0 };

        // The configured mode is ignored: decode_inline stays on this thread.
        let mut decoder = Decoder::with_config(source, PipelineConfig::threaded());
        assert_eq!(decoder.decode_inline::<Value>().unwrap(), json!({"foo": "bar"}));
        assert_eq!(decoder.decode_inline::<Vec<u8>>().unwrap(), vec![1, 2]);
        assert!(decoder.is_exhausted().unwrap());
    }

    #[test]
    fn accessors_expose_source_and_config() {
        let config = PipelineConfig::threaded();
        let decoder = Decoder::with_config(Cursor::new(gzip(b"null")), config.clone());

        assert_eq!(decoder.config(), &config);
        assert_eq!(decoder.config().mode, PipelineMode::Threaded);
        assert_eq!(decoder.get_ref().position(), 0);

        let cursor = decoder.into_inner();
        assert_eq!(cursor.position(), 0);
    }
}
