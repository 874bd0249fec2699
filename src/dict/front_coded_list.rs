/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

An immutable, compact, random-access list of arrays of a fixed primitive
element type, compressed by front coding.

Front coding stores a sequence of arrays — typically sorted, so that
neighbours share long prefixes — by writing most arrays as just the length
of the prefix shared with their predecessor plus the differing suffix.
Every `ratio`-th array (an *anchor*) is instead stored in full, which
bounds how many records a random read has to walk before it can
reconstruct an arbitrary array.

There are two ways to build a [`FrontCodedList`]: incrementally, with a
[`FrontCodedListBuilder`], or in bulk from a finite collection via
[`FrontCodedList::from_arrays`].

# Examples

```rust
use frontcode::dict::front_coded_list::FrontCodedListBuilder;

let mut builder = FrontCodedListBuilder::<i8>::new(3).unwrap();
builder.push_str("foo");
builder.push_str("foobar");
builder.push_str("football");
builder.push_str("fool");
let list = builder.build();

assert_eq!(list.len(), 4);
assert_eq!(list.get_str(0), "foo");
assert_eq!(list.get_str(1), "foobar");
assert_eq!(list.get_str(2), "football");
assert_eq!(list.get_str(3), "fool");
```

*/

use crate::buffer::ElementBuffer;
use crate::varint::{Element, Varint};
use crate::DivCeilUnchecked;
use anyhow::{ensure, Context, Result};
use mem_dbg::{MemDbg, MemSize};
use std::io::{Read, Write};

/// Compression statistics accumulated while a [`FrontCodedListBuilder`] runs.
///
/// Purely informational: nothing in the crate reads these back to make
/// decisions. Exposed so a caller can judge whether a given `ratio` is
/// paying for itself on their data.
#[derive(Debug, Clone, Default, MemDbg, MemSize)]
pub struct Stats {
    /// Largest block size seen, in elements (including varint headers).
    pub max_block_elements: usize,
    /// Sum of all block sizes, in elements.
    pub sum_block_elements: usize,
    /// Largest shared-prefix length seen between consecutive arrays.
    pub max_common: usize,
    /// Sum of all shared-prefix lengths.
    pub sum_common: usize,
    /// Longest input array, in elements.
    pub max_array_len: usize,
    /// Sum of all input array lengths, in elements.
    pub sum_array_len: usize,
    /// Elements spent on varint headers (lengths and common-prefix counts).
    pub code_elements: usize,
    /// Elements spent on anchor payloads and delta suffixes.
    pub suffix_elements: usize,
}

impl Stats {
    /// Prints a human-readable breakdown of the accumulated statistics.
    pub fn print_stats(&self, n: usize) {
        println!("{:>20}: {:>10}", "max_block_elements", self.max_block_elements);
        println!(
            "{:>20}: {:>10.3}",
            "avg_block_elements",
            self.sum_block_elements as f64 / n.max(1) as f64
        );
        println!("{:>20}: {:>10}", "max_common", self.max_common);
        println!(
            "{:>20}: {:>10.3}",
            "avg_common",
            self.sum_common as f64 / n.max(1) as f64
        );
        println!("{:>20}: {:>10}", "max_array_len", self.max_array_len);
        println!(
            "{:>20}: {:>10.3}",
            "avg_array_len",
            self.sum_array_len as f64 / n.max(1) as f64
        );
        println!("{:>20}: {:>10}", "code_elements", self.code_elements);
        println!("{:>20}: {:>10}", "suffix_elements", self.suffix_elements);
        println!(
            "compression_ratio: {:.3}",
            (self.code_elements + self.suffix_elements) as f64 / self.sum_array_len.max(1) as f64
        );
    }
}

/// Computes the length of the longest common prefix between `a` and `b`.
#[inline(always)]
fn longest_common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let min_len = a.len().min(b.len());
    let mut i = 0;
    while i < min_len && a[i] == b[i] {
        i += 1;
    }
    i
}

/// The geometry of a single stored record, as located by [`FrontCodedList::locate`].
struct Record {
    /// Offset of the first element of the *next* record, if any.
    end_pos: u64,
    /// The full logical length of the array this record represents.
    array_len: u64,
}

/// An immutable, compact, random-access list of arrays, compressed by front
/// coding. See the [module documentation](self) for the overall design.
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct FrontCodedList<T: Element> {
    /// Number of arrays stored.
    n: u32,
    /// Block size: one anchor every `ratio` arrays.
    ratio: u32,
    /// The encoded elements: a sequence of anchor and delta records.
    buffer: ElementBuffer<T>,
    /// Offsets of the anchor record for logical arrays `0, ratio, 2*ratio, ...`.
    ///
    /// Not persisted: [`FrontCodedList::deserialize`] recomputes it via
    /// [`FrontCodedList::rebuild`].
    index: Vec<u64>,
    /// Compression statistics gathered while building.
    pub stats: Stats,
}

impl<T: Element> FrontCodedList<T> {
    /// Number of arrays in the list.
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.n
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Block size: one anchor every `ratio` arrays.
    #[inline(always)]
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    #[inline(always)]
    fn read_varint(&self, pos: u64) -> (u64, u64) {
        let (v, next) = T::varint_read(self.buffer.as_slice(), pos as usize);
        (v, next as u64)
    }

    /// Locates record `i`: where its payload starts, where the next record
    /// starts, and its geometry: the same walk `array_length` needs, generalized to
    /// also report the bookkeeping [`FrontCodedList::extract`] needs.
    ///
    /// Does not bounds-check `i`; callers must do so first.
    fn locate(&self, i: u32) -> Record {
        let block = (i / self.ratio) as usize;
        let delta = i % self.ratio;
        let pos0 = self.index[block];
        let (l0, anchor_payload) = self.read_varint(pos0);

        if delta == 0 {
            return Record {
                end_pos: anchor_payload + l0,
                array_len: l0,
            };
        }

        let mut prev_payload = anchor_payload;
        let mut prev_stored_len = l0;
        let mut suffix_len = 0u64;
        let mut common = 0u64;
        let mut payload_pos = 0u64;

        for _ in 0..delta {
            let header_pos = prev_payload + prev_stored_len;
            let (sl, p1) = self.read_varint(header_pos);
            let (c, p2) = self.read_varint(p1);
            suffix_len = sl;
            common = c;
            payload_pos = p2;

            prev_payload = payload_pos;
            prev_stored_len = suffix_len;
        }

        Record {
            end_pos: payload_pos + suffix_len,
            array_len: suffix_len + common,
        }
    }

    /// Length of array `i`, without reconstructing it.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn array_length(&self, i: u32) -> u32 {
        assert!(i < self.n, "index {i} out of bounds for length {}", self.n);
        self.locate(i).array_len as u32
    }

    /// Reconstructs up to `cap` elements of array `i` into
    /// `dst[offset..offset + cap]`, copying each buffer element at most
    /// once. Returns the array's true length regardless of `cap`.
    ///
    /// This never writes an
    /// element it would later overwrite, so its cost is proportional to
    /// the output length plus the delta walk, not the cumulative lengths
    /// of every predecessor in the block.
    fn extract(&self, i: u32, dst: &mut [T], offset: usize, cap: usize) -> u32 {
        let block = (i / self.ratio) as usize;
        let delta = i % self.ratio;
        let pos0 = self.index[block];
        let (l0, anchor_payload) = self.read_varint(pos0);

        if delta == 0 {
            let n = (cap as u64).min(l0) as usize;
            self.buffer.copy_out(anchor_payload, n, &mut dst[offset..offset + n]);
            return l0 as u32;
        }

        let mut prev_array_pos = anchor_payload;
        let mut prev_array_len = l0;
        let mut written: usize = 0;
        let mut suffix_len = 0u64;
        let mut common = 0u64;
        let mut payload_pos = 0u64;

        for _ in 0..delta {
            let header_pos = prev_array_pos + prev_array_len;
            let (sl, p1) = self.read_varint(header_pos);
            let (c, p2) = self.read_varint(p1);
            suffix_len = sl;
            common = c;
            payload_pos = p2;

            let effective_common = (common as usize).min(cap);
            if effective_common > written {
                let n = effective_common - written;
                self.buffer.copy_out(
                    prev_array_pos + written as u64,
                    n,
                    &mut dst[offset + written..offset + effective_common],
                );
            }
            written = effective_common;

            prev_array_pos = payload_pos;
            prev_array_len = suffix_len;
        }

        if written < cap {
            let n = (suffix_len as usize).min(cap - written);
            self.buffer
                .copy_out(payload_pos, n, &mut dst[offset + written..offset + written + n]);
        }

        (suffix_len + common) as u32
    }

    /// Reconstructs and returns a freshly allocated copy of array `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get(&self, i: u32) -> Vec<T> {
        assert!(i < self.n, "index {i} out of bounds for length {}", self.n);
        let len = self.array_length(i) as usize;
        let mut out = vec![T::default(); len];
        self.extract(i, &mut out, 0, len);
        out
    }

    /// Reconstructs up to `cap` elements of array `i` into
    /// `dst[offset..offset + cap]`.
    ///
    /// Returns the array's true length if `cap` was large enough to hold
    /// it in full; otherwise returns `cap as i64 - true_length as i64`, a
    /// non-positive number whose magnitude is the shortfall (so
    /// `true_length == cap as i64 - result` whenever `result <= 0`).
    ///
    /// # Panics
    /// Panics if `i >= self.len()` or if `offset + cap > dst.len()`.
    pub fn get_into(&self, i: u32, dst: &mut [T], offset: usize, cap: usize) -> i64 {
        assert!(i < self.n, "index {i} out of bounds for length {}", self.n);
        assert!(
            offset + cap <= dst.len(),
            "offset {offset} + cap {cap} exceeds destination length {}",
            dst.len()
        );
        let actual = self.extract(i, dst, offset, cap) as i64;
        if cap as i64 >= actual {
            actual
        } else {
            cap as i64 - actual
        }
    }

    /// Equivalent to `self.get_into(i, dst, 0, dst.len())`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn get_fill(&self, i: u32, dst: &mut [T]) -> i64 {
        let cap = dst.len();
        self.get_into(i, dst, 0, cap)
    }

    /// A bidirectional cursor starting just before logical index `start`
    /// (so that the first call to [`Cursor::next`] returns array `start`).
    ///
    /// `start == self.len()` is valid and yields a cursor with no next
    /// element.
    ///
    /// # Panics
    /// Panics if `start > self.len()`.
    pub fn iter_from(&self, start: u32) -> Cursor<'_, T> {
        Cursor::new(self, start)
    }

    /// A cursor over the whole list, equivalent to `self.iter_from(0)`.
    pub fn iter(&self) -> Cursor<'_, T> {
        self.iter_from(0)
    }

    /// Builds a list from a finite collection of arrays, equivalent to
    /// pushing each array into a [`FrontCodedListBuilder`] in order.
    pub fn from_arrays<I, A>(ratio: u32, arrays: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[T]>,
    {
        let mut builder = FrontCodedListBuilder::new(ratio)?;
        builder.extend(arrays);
        Ok(builder.build())
    }

    /// Builds a list from a producing iterator of arrays, equivalent to
    /// [`FrontCodedList::from_arrays`] but named for the "producing
    /// iterator" construction path: the arrays are consumed lazily, one at
    /// a time, rather than requiring a materialized collection.
    ///
    /// Compression only benefits from front coding if consecutive arrays
    /// share long prefixes, which in practice means the iterator should
    /// yield arrays in lexicographic order; this is the caller's
    /// responsibility, not something this method checks or enforces.
    pub fn from_sorted_iter<I, A>(ratio: u32, arrays: I) -> Result<Self>
    where
        I: Iterator<Item = A>,
        A: AsRef<[T]>,
    {
        let mut builder = FrontCodedListBuilder::new(ratio)?;
        for array in arrays {
            builder.push(array.as_ref());
        }
        Ok(builder.build())
    }

    /// Recomputes the block index from `buffer`, `n`, and `ratio`.
    ///
    /// This is the only place the crate walks a buffer it has not itself
    /// just written, so it is the only place that returns a `DataCorruption`-style
    /// error rather than trusting the input: if a varint's declared
    /// continuation runs past the end of the buffer, or the walk needs more
    /// elements than the buffer has, the load is rejected instead of
    /// panicking or reading out of bounds.
    fn rebuild(n: u32, ratio: u32, buffer: ElementBuffer<T>) -> Result<Self> {
        ensure!(ratio >= 1, "ratio must be >= 1, got {ratio}");

        let mut index = Vec::with_capacity(n.div_ceil_unchecked(ratio.max(1)) as usize);
        let mut pos = 0u64;
        let mut skip = ratio - 1;

        for _ in 0..n {
            let (len, p1) =
                T::varint_read_checked(buffer.as_slice(), pos as usize).context("front-coded buffer truncated: corrupt data")?;
            skip += 1;
            if skip == ratio {
                skip = 0;
                index.push(pos);
                pos = p1 as u64 + len;
            } else {
                let (_common, p2) = T::varint_read_checked(buffer.as_slice(), p1)
                    .context("front-coded buffer truncated: corrupt data")?;
                pos = p2 as u64 + len;
            }
            ensure!(
                pos <= buffer.len(),
                "front-coded buffer truncated: record claims {len} elements past the end"
            );
        }

        ensure!(
            index.len() as u32 == n.div_ceil_unchecked(ratio.max(1)),
            "front-coded buffer rebuild produced the wrong index size: corrupt data"
        );

        Ok(Self {
            n,
            ratio,
            buffer,
            index,
            stats: Stats::default(),
        })
    }

    /// Writes the persistent form of this list: `n`, `ratio`, and the
    /// encoded buffer. The block index is intentionally not written; it is
    /// recomputed by [`FrontCodedList::deserialize`].
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.n.to_le_bytes())?;
        writer.write_all(&self.ratio.to_le_bytes())?;
        let elems = self.buffer.as_slice();
        writer.write_all(&(elems.len() as u64).to_le_bytes())?;
        writer.write_all(bytemuck::cast_slice(elems))?;
        Ok(())
    }

    /// Reads a list previously written by [`FrontCodedList::serialize`],
    /// recomputing the block index via [`FrontCodedList::rebuild`].
    pub fn deserialize<R: Read>(reader: &mut R) -> Result<Self> {
        let mut n_bytes = [0u8; 4];
        reader.read_exact(&mut n_bytes).context("reading element count")?;
        let n = u32::from_le_bytes(n_bytes);

        let mut ratio_bytes = [0u8; 4];
        reader.read_exact(&mut ratio_bytes).context("reading ratio")?;
        let ratio = u32::from_le_bytes(ratio_bytes);
        ensure!(ratio >= 1, "deserialized ratio must be >= 1, got {ratio}");

        let mut len_bytes = [0u8; 8];
        reader.read_exact(&mut len_bytes).context("reading buffer length")?;
        let elem_count = u64::from_le_bytes(len_bytes) as usize;
        let byte_len = elem_count
            .checked_mul(core::mem::size_of::<T>())
            .context("buffer length overflows a byte count")?;

        let mut raw = vec![0u8; byte_len];
        reader.read_exact(&mut raw).context("reading buffer contents")?;
        let elems: Vec<T> = bytemuck::pod_collect_to_vec(&raw);

        Self::rebuild(n, ratio, ElementBuffer::from_vec(elems))
    }
}

/// Block size used by the [`FromIterator`] impl, which has no parameter
/// through which a caller could supply their own ratio.
pub const DEFAULT_RATIO: u32 = 16;

impl<T: Element, A: AsRef<[T]>> FromIterator<A> for FrontCodedList<T> {
    /// Builds a list with [`DEFAULT_RATIO`], for contexts (e.g. `.collect()`)
    /// that cannot pass an explicit ratio. Use [`FrontCodedList::from_arrays`]
    /// or [`FrontCodedList::from_sorted_iter`] directly to choose one.
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::from_arrays(DEFAULT_RATIO, iter).expect("DEFAULT_RATIO is always >= 1")
    }
}

impl<T: Element> core::fmt::Display for FrontCodedList<T> {
    /// A bracketed, comma-separated textual rendering, built by scanning
    /// the whole list with a [`Cursor`]. For debugging only; no contractual
    /// format.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[")?;
        for (idx, array) in self.iter().into_iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{array:?}")?;
        }
        write!(f, "]")
    }
}

// ---- i8 specialization: front-coded byte strings are the common case. ----

impl FrontCodedList<i8> {
    /// Reconstructs array `i` and interprets it as a UTF-8 string.
    ///
    /// # Panics
    /// Panics if `i >= self.len()` or the array is not valid UTF-8.
    pub fn get_str(&self, i: u32) -> String {
        let bytes: Vec<u8> = bytemuck::cast_vec(self.get(i));
        String::from_utf8(bytes).expect("front-coded i8 array is not valid UTF-8")
    }

    /// Builds a list of byte strings from a line-oriented reader, one array
    /// per line (trailing `\n`/`\r\n` stripped), without materializing
    /// every line as an owned `String` first.
    pub fn from_lines<R: std::io::BufRead>(reader: R, ratio: u32) -> Result<Self> {
        use crate::utils::file::LineLender;
        use lender::Lender;

        let mut builder = FrontCodedListBuilder::<i8>::new(ratio)?;
        let mut lender: LineLender<R> = reader.into();
        while let Some(line) = lender.next() {
            builder.push_str(line.context("reading line")?);
        }
        Ok(builder.build())
    }
}

/// Incremental builder for a [`FrontCodedList`].
///
/// Consumes arrays in order via [`FrontCodedListBuilder::push`] (or
/// [`FrontCodedListBuilder::extend`]), then [`FrontCodedListBuilder::build`]
/// freezes the result. No intermediate state is observable from outside.
pub struct FrontCodedListBuilder<T: Element> {
    ratio: u32,
    buffer: ElementBuffer<T>,
    index: Vec<u64>,
    n: u32,
    prev: Vec<T>,
    stats: Stats,
}

impl<T: Element> FrontCodedListBuilder<T> {
    /// Creates a builder with the given block size.
    ///
    /// `ratio == 1` means every array is stored as an anchor (no prefix
    /// sharing at all).
    pub fn new(ratio: u32) -> Result<Self> {
        ensure!(ratio >= 1, "ratio must be >= 1, got {ratio}");
        Ok(Self {
            ratio,
            buffer: ElementBuffer::with_capacity(1 << 16),
            index: Vec::new(),
            n: 0,
            prev: Vec::with_capacity(256),
            stats: Stats::default(),
        })
    }

    #[inline]
    fn write_varint(&mut self, v: u64) {
        let mut tmp = [T::default(); 8];
        let count = T::varint_write(&mut tmp, 0, v);
        self.buffer.extend_from_slice(&tmp[..count]);
    }

    /// Appends `array` to the end of the list.
    #[inline]
    pub fn push(&mut self, array: &[T]) {
        self.stats.max_array_len = self.stats.max_array_len.max(array.len());
        self.stats.sum_array_len += array.len();

        if self.n % self.ratio == 0 {
            let last_ptr = self.index.last().copied().unwrap_or(0);
            let block_elements = self.buffer.len() - last_ptr;
            self.stats.max_block_elements = self.stats.max_block_elements.max(block_elements as usize);
            self.stats.sum_block_elements += block_elements as usize;

            self.index.push(self.buffer.len());
            let before = self.buffer.len();
            self.write_varint(array.len() as u64);
            self.buffer.extend_from_slice(array);
            self.stats.code_elements += (self.buffer.len() - before) as usize - array.len();
            self.stats.suffix_elements += array.len();
        } else {
            let common = longest_common_prefix(&self.prev, array);
            self.stats.max_common = self.stats.max_common.max(common);
            self.stats.sum_common += common;

            let suffix = &array[common..];
            let before = self.buffer.len();
            self.write_varint(suffix.len() as u64);
            self.write_varint(common as u64);
            self.buffer.extend_from_slice(suffix);
            self.stats.code_elements += (self.buffer.len() - before) as usize - suffix.len();
            self.stats.suffix_elements += suffix.len();
        }

        self.prev.clear();
        self.prev.extend_from_slice(array);
        self.n += 1;
    }

    /// Compression statistics accumulated so far.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Appends all the arrays from an iterator, in order.
    pub fn extend<I, A>(&mut self, iter: I)
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[T]>,
    {
        for array in iter {
            self.push(array.as_ref());
        }
    }

    /// Freezes the builder into an immutable [`FrontCodedList`], trimming
    /// excess capacity accumulated during geometric growth.
    pub fn build(mut self) -> FrontCodedList<T> {
        self.buffer.shrink_to_fit();
        self.index.shrink_to_fit();
        FrontCodedList {
            n: self.n,
            ratio: self.ratio,
            buffer: self.buffer,
            index: self.index,
            stats: self.stats,
        }
    }
}

impl FrontCodedListBuilder<i8> {
    /// Appends a string, reinterpreting its UTF-8 bytes as `i8` elements.
    pub fn push_str<S: AsRef<str>>(&mut self, s: S) {
        let bytes: &[i8] = bytemuck::cast_slice(s.as_ref().as_bytes());
        self.push(bytes);
    }
}

/// A bidirectional positional cursor over a [`FrontCodedList`].
///
/// Scanning forward is cheap: each [`Cursor::next`] call does one varint
/// read plus one contiguous copy, with no block-index lookup and no
/// recomputation of earlier arrays. Scanning backward (or repositioning
/// after a backward move) falls back to the reader's ordinary random-access
/// path.
///
/// A cursor owns a private scratch buffer and positional state; it cannot
/// be shared between concurrent readers (the list itself can be, since it
/// is immutable).
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct Cursor<'a, T: Element> {
    list: &'a FrontCodedList<T>,
    /// Logical index of the next element `next()` will return.
    i: u32,
    /// Buffer offset of the record `next()` will read, when `in_sync`.
    pos: u64,
    /// The last array produced, kept live so an in-sync `next()` only has
    /// to patch its differing suffix.
    scratch: Vec<T>,
    /// Whether `scratch` currently holds `array[i - 1]` and `pos` points at
    /// the record for `array[i]`.
    in_sync: bool,
}

impl<'a, T: Element> Cursor<'a, T> {
    fn new(list: &'a FrontCodedList<T>, start: u32) -> Self {
        assert!(
            start <= list.n,
            "cursor start {start} out of bounds for length {}",
            list.n
        );

        if start == 0 || start == list.n {
            return Self {
                list,
                i: start,
                pos: 0,
                scratch: Vec::new(),
                in_sync: false,
            };
        }

        let block = (start / list.ratio) as usize;
        let rem = start % list.ratio;
        let mut cursor = Self {
            list,
            i: start - rem,
            pos: list.index[block],
            scratch: Vec::new(),
            in_sync: false,
        };
        for _ in 0..rem {
            cursor.next();
        }
        cursor
    }

    #[inline(always)]
    pub fn has_next(&self) -> bool {
        self.i < self.list.n
    }

    #[inline(always)]
    pub fn has_previous(&self) -> bool {
        self.i > 0
    }

    /// Logical index the next call to [`Cursor::next`] will return.
    #[inline(always)]
    pub fn next_index(&self) -> u32 {
        self.i
    }

    /// Logical index the next call to [`Cursor::previous`] will return,
    /// or `-1` if there is none (matching the usual `ListIterator`
    /// convention for an index at the very start).
    #[inline(always)]
    pub fn previous_index(&self) -> i64 {
        self.i as i64 - 1
    }

    /// Advances the cursor and returns a fresh copy of array `next_index()`.
    ///
    /// # Panics
    /// Panics if `!self.has_next()`.
    pub fn next(&mut self) -> Vec<T> {
        assert!(
            self.has_next(),
            "cursor exhausted: no next element (i = {}, len = {})",
            self.i,
            self.list.n
        );

        let len;
        if self.i % self.list.ratio == 0 {
            let (l, payload_pos) = self.list.read_varint(self.pos);
            len = l as usize;
            self.scratch.resize(len, T::default());
            self.list.buffer.copy_out(payload_pos, len, &mut self.scratch[..len]);
            self.pos = payload_pos + l;
            self.in_sync = true;
        } else if self.in_sync {
            let (suffix_len, p1) = self.list.read_varint(self.pos);
            let (common, p2) = self.list.read_varint(p1);
            len = (suffix_len + common) as usize;
            self.scratch.resize(len, T::default());
            self.list
                .buffer
                .copy_out(p2, suffix_len as usize, &mut self.scratch[common as usize..len]);
            self.pos = p2 + suffix_len;
            self.in_sync = true;
        } else {
            let array = self.list.get(self.i);
            len = array.len();
            self.scratch.clear();
            self.scratch.extend_from_slice(&array);
            self.pos = self.list.locate(self.i).end_pos;
            self.in_sync = true;
        }

        self.i += 1;
        self.scratch[..len].to_vec()
    }

    /// Steps the cursor back and returns a fresh copy of array
    /// `previous_index()`, via the reader's ordinary random-access path.
    ///
    /// Clears the in-sync fast path: the next forward [`Cursor::next`]
    /// call will re-synchronize from scratch, since `pos` no longer
    /// describes a record adjacent to where the cursor now sits.
    ///
    /// # Panics
    /// Panics if `!self.has_previous()`.
    pub fn previous(&mut self) -> Vec<T> {
        assert!(
            self.has_previous(),
            "cursor exhausted: no previous element (i = {})",
            self.i
        );
        self.in_sync = false;
        self.i -= 1;
        self.list.get(self.i)
    }
}

impl<'a, T: Element> IntoIterator for Cursor<'a, T> {
    type Item = Vec<T>;
    type IntoIter = CursorIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        CursorIter(self)
    }
}

/// A standard [`Iterator`] adapter over a [`Cursor`], for use in `for`
/// loops and iterator-combinator chains. The underlying [`Cursor::next`]
/// contract panics on exhaustion, matching a Java-style iterator's
/// `NoSuchElementException`; this adapter instead returns `None`,
/// as Rust's `Iterator` protocol expects.
pub struct CursorIter<'a, T: Element>(Cursor<'a, T>);

impl<'a, T: Element> Iterator for CursorIter<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.has_next() {
            Some(self.0.next())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.0.list.n - self.0.i) as usize;
        (remaining, Some(remaining))
    }
}

impl<'a, T: Element> ExactSizeIterator for CursorIter<'a, T> {}
