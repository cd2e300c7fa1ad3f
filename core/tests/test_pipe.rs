#[cfg(test)]
mod tests {
    use std::io::{self, BufRead, Read, Write};
    use std::thread;

    use gzjson_core::stream::pipe::pipe;

    #[test]
    fn close_delivers_buffered_bytes_then_eof() {
        let (mut writer, mut reader) = pipe(4, 16);
        writer.write_all(b"hello conduit").unwrap();
        writer.close().unwrap();

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello conduit");
    }

    #[test]
    fn dropping_writer_discards_unsent_bytes() {
        let (mut writer, mut reader) = pipe(4, 4);
        writer.write_all(b"abcdef").unwrap(); // "abcd" sent, "ef" buffered
        drop(writer);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"abcd");
    }

    #[test]
    fn abort_surfaces_error_kind_to_reader() {
        let (mut writer, mut reader) = pipe(4, 4);
        writer.write_all(b"abcd").unwrap();
        writer.abort(&io::Error::new(io::ErrorKind::InvalidData, "bad member"));

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        let err = reader.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("bad member"));

        // After the error the conduit is finished.
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn dropped_reader_breaks_writer() {
        let (mut writer, reader) = pipe(1, 4);
        drop(reader);

        let err = writer.write_all(b"abcd").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn dropped_reader_releases_blocked_writer() {
        let (mut writer, mut reader) = pipe(1, 4);

        thread::scope(|s| {
            let producer = s.spawn(move || writer.write_all(&[7u8; 4096]));

            let mut first = [0u8; 4];
            reader.read_exact(&mut first).unwrap();
            drop(reader);

            let err = producer.join().unwrap().unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        });
    }

    #[test]
    fn back_pressure_preserves_order() {
        let (mut writer, mut reader) = pipe(1, 8);
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        let received = thread::scope(|s| {
            let expected = payload.clone();
            s.spawn(move || {
                writer.write_all(&expected).unwrap();
                writer.close().unwrap();
            });

            let mut out = Vec::new();
            reader.read_to_end(&mut out).unwrap();
            out
        });

        assert_eq!(received, payload);
    }

    #[test]
    fn fill_buf_and_consume_walk_chunks() {
        let (mut writer, mut reader) = pipe(4, 4);
        writer.write_all(b"abcdefgh").unwrap();
        writer.close().unwrap();

        assert_eq!(reader.fill_buf().unwrap(), b"abcd");
        reader.consume(2);
        assert_eq!(reader.fill_buf().unwrap(), b"cd");
        reader.consume(2);
        assert_eq!(reader.fill_buf().unwrap(), b"efgh");
        reader.consume(4);
        assert!(reader.fill_buf().unwrap().is_empty());
    }

    #[test]
    fn drain_counts_remaining_bytes() {
        let (mut writer, mut reader) = pipe(8, 4);
        writer.write_all(b"0123456789").unwrap();
        writer.close().unwrap();

        let mut head = [0u8; 3];
        reader.read_exact(&mut head).unwrap();
        assert_eq!(reader.drain().unwrap(), 7);
    }
}
