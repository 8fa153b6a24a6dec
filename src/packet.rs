use byteorder::{ByteOrder, LittleEndian};
use log::{trace, warn};

use crate::transport::Transport;

const MAX_PAYLOAD_LEN: usize = 0xFF_FFFF;

/// Frames packets over a [`Transport`]: a 3-byte little-endian payload length, a
/// 1-byte sequence number, then the payload. Reassembles logical packets that span
/// more than one physical frame (payload length exactly `0xFFFFFF`) and enforces that
/// the server's sequence byte matches what's expected.
pub(crate) struct PacketStream<T> {
    transport: T,
    rbuf: Vec<u8>,
    next_seq_no: u8,
    /// Set the moment a fatal transport or protocol error is detected, at the same
    /// point the underlying transport is closed — never deferred to the caller.
    killed: bool,
}

impl<T: Transport> PacketStream<T> {
    pub(crate) fn new(transport: T) -> Self {
        Self {
            transport,
            rbuf: Vec::with_capacity(4096),
            next_seq_no: 0,
            killed: false,
        }
    }

    /// Resets the sequence counter to 0, as required before sending a new command.
    pub(crate) fn begin_command(&mut self) {
        self.next_seq_no = 0;
    }

    /// True once a fatal error has closed the transport, whether detected internally
    /// (a bad read/write or an out-of-order sequence number) or via an explicit
    /// [`Self::poison`] call.
    pub(crate) fn is_killed(&self) -> bool {
        self.killed
    }

    /// Marks the stream dead and closes the transport. Called both by an explicit,
    /// caller-requested kill and internally whenever `send`/`receive` hit a fatal error.
    pub(crate) fn poison(&mut self) {
        self.killed = true;
        let _ = self.transport.close();
    }

    /// Writes `payload` as one or more physical frames, splitting at `0xFFFFFF` byte
    /// boundaries and emitting a trailing zero-length frame when the payload is an
    /// exact multiple of that boundary (so the peer can tell where the logical packet
    /// ends).
    pub(crate) fn send(&mut self, payload: &[u8]) -> crate::Result<()> {
        trace!("sending packet (seq={}, {} bytes)", self.next_seq_no, payload.len());

        let mut remaining = payload;
        loop {
            let chunk_len = remaining.len().min(MAX_PAYLOAD_LEN);
            let (chunk, rest) = remaining.split_at(chunk_len);

            let mut header = [0u8; 4];
            LittleEndian::write_u24(&mut header[..3], chunk_len as u32);
            header[3] = self.next_seq_no;
            self.next_seq_no = self.next_seq_no.wrapping_add(1);

            if let Err(e) = self.transport.write(&header).and_then(|_| self.transport.write(chunk)) {
                warn!("transport write failed, killing connection: {}", e);
                self.poison();
                return Err(e.into());
            }

            remaining = rest;

            if chunk_len < MAX_PAYLOAD_LEN {
                break;
            }
            if remaining.is_empty() {
                // exact multiple of the boundary: emit a closing zero-length frame
                let mut header = [0u8; 4];
                header[3] = self.next_seq_no;
                self.next_seq_no = self.next_seq_no.wrapping_add(1);
                if let Err(e) = self.transport.write(&header) {
                    warn!("transport write failed, killing connection: {}", e);
                    self.poison();
                    return Err(e.into());
                }
                break;
            }
        }

        Ok(())
    }

    /// Reads one logical packet, reassembling physical frames as needed, and returns
    /// a reference to the reassembled payload. The reference is invalidated by the
    /// next call to `receive`.
    pub(crate) fn receive(&mut self) -> crate::Result<&[u8]> {
        self.rbuf.clear();
        let mut last_seq_no = 0u8;

        loop {
            let mut header = [0u8; 4];
            if let Err(e) = self.transport.read(&mut header) {
                warn!("transport read failed, killing connection: {}", e);
                self.poison();
                return Err(e.into());
            }

            let payload_len = LittleEndian::read_u24(&header[..3]) as usize;
            let seq_no = header[3];

            if seq_no != self.next_seq_no {
                warn!(
                    "server packet out of order (expected sequence {}, received {}), killing connection",
                    self.next_seq_no, seq_no
                );
                self.poison();
                return Err(protocol_err!(
                    "server packet out of order: expected sequence {}, received {}",
                    self.next_seq_no,
                    seq_no
                )
                .into());
            }
            last_seq_no = seq_no;
            self.next_seq_no = self.next_seq_no.wrapping_add(1);

            let start = self.rbuf.len();
            self.rbuf.resize(start + payload_len, 0);
            if let Err(e) = self.transport.read(&mut self.rbuf[start..]) {
                warn!("transport read failed, killing connection: {}", e);
                self.poison();
                return Err(e.into());
            }

            if payload_len < MAX_PAYLOAD_LEN {
                break;
            }
        }

        trace!("received packet (seq={}, {} bytes)", last_seq_no, self.rbuf.len());
        Ok(&self.rbuf)
    }

    pub(crate) fn close(&mut self) -> crate::Result<()> {
        self.transport.close().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    #[test]
    fn it_reads_a_single_frame_packet() {
        let mut mock = MockTransport::new();
        mock.push_read(&[0x03, 0x00, 0x00, 0x00]);
        mock.push_read(b"abc");

        let mut stream = PacketStream::new(mock);
        assert_eq!(stream.receive().unwrap(), b"abc");
    }

    #[test]
    fn it_rejects_an_out_of_order_sequence_number() {
        let mut mock = MockTransport::new();
        mock.push_read(&[0x01, 0x00, 0x00, 0x05]);
        mock.push_read(b"x");

        let mut stream = PacketStream::new(mock);
        assert!(stream.receive().is_err());
    }

    #[test]
    fn it_reassembles_a_payload_spanning_two_frames() {
        let mut mock = MockTransport::new();
        let big_chunk = vec![0xAB; MAX_PAYLOAD_LEN];

        mock.push_read(&[0xFF, 0xFF, 0xFF, 0x00]);
        mock.push_read(&big_chunk);
        mock.push_read(&[0x02, 0x00, 0x00, 0x01]);
        mock.push_read(b"yz");

        let mut stream = PacketStream::new(mock);
        let received = stream.receive().unwrap();
        assert_eq!(received.len(), MAX_PAYLOAD_LEN + 2);
        assert_eq!(&received[MAX_PAYLOAD_LEN..], b"yz");
    }

    #[test]
    fn it_resets_sequence_on_begin_command() {
        let mock = MockTransport::new();
        let mut stream = PacketStream::new(mock);
        stream.next_seq_no = 7;
        stream.begin_command();
        assert_eq!(stream.next_seq_no, 0);
    }
}
