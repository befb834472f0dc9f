//! Basic synchronous re-framing example.
//!
//! Feeds a stream in uneven pieces and prints the re-framed chunks: a
//! 13-byte header followed by 16-byte records.
//!
//! Run with:
//!     cargo run --example sync_basic

use rechunkrs::{ChunkRule, Identity, RechunkError, Rechunker};

fn main() -> Result<(), RechunkError> {
    let data: Vec<u8> = (0..100u8).collect();

    let rule = ChunkRule::new(13, 16)?;
    let mut rechunker = Rechunker::new(rule, Identity);

    println!("Re-framing {} bytes with {:?}\n", data.len(), rule);

    let mut total_chunks = 0;
    for piece in data.chunks(23) {
        println!("Received piece: {} bytes", piece.len());

        for chunk in rechunker.push(piece)? {
            total_chunks += 1;
            println!("  Chunk {:>2}: len={:>3} {:02x?}", total_chunks, chunk.len(), &chunk[..4]);
        }
    }

    if let Some(last) = rechunker.finish()? {
        total_chunks += 1;
        println!("  Chunk {:>2}: len={:>3} (final)", total_chunks, last.len());
    }

    println!("\nTotal: {} chunks, {} bytes", total_chunks, rechunker.offset());
    Ok(())
}
