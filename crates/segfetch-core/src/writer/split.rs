//! Chunk placement and splitting at segment boundaries.

/// Bytes fetched by one ranged GET, or the overflow part of such a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Absolute offset of the first payload byte in the content.
    pub offset: u64,
    pub payload: Vec<u8>,
}

impl Chunk {
    pub fn new(offset: u64, payload: Vec<u8>) -> Self {
        Self { offset, payload }
    }

    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Absolute offset one past the last payload byte.
    pub fn end(&self) -> u64 {
        self.offset + self.size()
    }
}

/// Where an absolute offset lands: which segment, and where inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub segment_start: u64,
    pub file_offset: u64,
}

impl Placement {
    pub fn of(offset: u64, segment_size: u64) -> Self {
        let segment_start = offset / segment_size * segment_size;
        Self {
            segment_start,
            file_offset: offset - segment_start,
        }
    }
}

/// Cut `chunk` at the end of the segment it starts in.
///
/// Returns the part that fits (`segment_size - file_offset` bytes at most) and,
/// if the chunk crosses the boundary, the trailing overflow starting exactly at
/// the next segment. The overflow may itself span further segments.
pub fn split_at_segment_boundary(mut chunk: Chunk, segment_size: u64) -> (Chunk, Option<Chunk>) {
    let placement = Placement::of(chunk.offset, segment_size);
    let room = segment_size - placement.file_offset;
    if chunk.size() <= room {
        return (chunk, None);
    }
    let tail = chunk.payload.split_off(room as usize);
    let overflow = Chunk::new(chunk.offset + room, tail);
    (chunk, Some(overflow))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_of_offsets() {
        assert_eq!(
            Placement::of(4, 6),
            Placement {
                segment_start: 0,
                file_offset: 4
            }
        );
        assert_eq!(
            Placement::of(6, 6),
            Placement {
                segment_start: 6,
                file_offset: 0
            }
        );
        assert_eq!(Placement::of(17, 6).segment_start, 12);
    }

    #[test]
    fn chunk_inside_segment_is_not_split() {
        let (head, rest) = split_at_segment_boundary(Chunk::new(0, b"abcd".to_vec()), 6);
        assert_eq!(head, Chunk::new(0, b"abcd".to_vec()));
        assert!(rest.is_none());

        // ends exactly on the boundary
        let (head, rest) = split_at_segment_boundary(Chunk::new(2, b"abcd".to_vec()), 6);
        assert_eq!(head.size(), 4);
        assert!(rest.is_none());
    }

    #[test]
    fn chunk_crossing_boundary_splits_at_next_segment() {
        // total=10, chunk=4, segment=6: the chunk at 4 spans 0.dat and 6.dat.
        let (head, rest) = split_at_segment_boundary(Chunk::new(4, b"4567".to_vec()), 6);
        assert_eq!(head, Chunk::new(4, b"45".to_vec()));
        let rest = rest.unwrap();
        assert_eq!(rest, Chunk::new(6, b"67".to_vec()));
        assert_eq!(Placement::of(rest.offset, 6).file_offset, 0);
    }

    #[test]
    fn split_parts_reassemble_original() {
        for segment_size in 1..12u64 {
            for offset in 0..20u64 {
                for len in 1..15usize {
                    let payload: Vec<u8> = (0..len).map(|i| (offset as usize + i) as u8).collect();
                    let original = Chunk::new(offset, payload.clone());
                    let (head, rest) = split_at_segment_boundary(original, segment_size);
                    let fo = Placement::of(offset, segment_size).file_offset;
                    assert!(head.size() <= segment_size - fo);
                    let mut joined = head.payload.clone();
                    if let Some(rest) = rest {
                        assert_eq!(head.size(), segment_size - fo);
                        assert_eq!(rest.offset, head.end());
                        assert_eq!(Placement::of(rest.offset, segment_size).file_offset, 0);
                        joined.extend_from_slice(&rest.payload);
                    }
                    assert_eq!(joined, payload);
                }
            }
        }
    }

    #[test]
    fn chunk_larger_than_segment_needs_repeated_splits() {
        let mut pending = Some(Chunk::new(1, (1u8..=10).collect()));
        let mut pieces = Vec::new();
        while let Some(chunk) = pending.take() {
            let (head, rest) = split_at_segment_boundary(chunk, 3);
            pieces.push((head.offset, head.payload));
            pending = rest;
        }
        assert_eq!(
            pieces,
            vec![
                (1, vec![1, 2]),
                (3, vec![3, 4, 5]),
                (6, vec![6, 7, 8]),
                (9, vec![9, 10]),
            ]
        );
    }
}
