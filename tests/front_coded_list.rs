/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use frontcode::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::BufReader;

fn sorted_word_list(n: usize, rng: &mut SmallRng) -> Vec<String> {
    let alphabet = b"abcdefghijklmnopqrstuvwxyz";
    let mut words: Vec<String> = (0..n)
        .map(|_| {
            let len = rng.gen_range(1..12);
            (0..len)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
                .collect()
        })
        .collect();
    words.sort();
    words
}

#[test]
fn test_front_coded_list_random_wordlist() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(0xF00D_CAFE);
    let words = sorted_word_list(2000, &mut rng);

    let mut builder = FrontCodedListBuilder::<i8>::new(8)?;
    builder.extend(words.iter().map(|w| w.as_bytes()));
    builder.stats().print_stats(words.len());
    let list = builder.build();

    assert_eq!(list.len() as usize, words.len());

    for (i, word) in words.iter().enumerate() {
        assert_eq!(list.get_str(i as u32), *word);
        assert_eq!(list.array_length(i as u32) as usize, word.len());
    }

    let mut cursor = list.iter();
    for word in words.iter() {
        let array = cursor.next();
        let bytes: Vec<u8> = bytemuck::cast_vec(array);
        assert_eq!(String::from_utf8(bytes).unwrap(), *word);
    }
    assert!(!cursor.has_next());

    Ok(())
}

#[test]
fn test_front_coded_list_various_ratios() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(1234);
    let words = sorted_word_list(500, &mut rng);

    for ratio in [1u32, 2, 3, 7, 16, 64] {
        let list = FrontCodedList::<i8>::from_arrays(ratio, words.iter().map(|w| w.as_bytes()))?;
        for (i, word) in words.iter().enumerate() {
            assert_eq!(list.get_str(i as u32), *word);
        }
    }

    Ok(())
}

#[test]
fn test_front_coded_list_persistence_roundtrip() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(99);
    let words = sorted_word_list(300, &mut rng);

    let list = FrontCodedList::<i8>::from_arrays(6, words.iter().map(|w| w.as_bytes()))?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("wordlist.fcl");
    {
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        list.serialize(&mut file)?;
    }

    let mut reader = BufReader::new(std::fs::File::open(&path)?);
    let restored = FrontCodedList::<i8>::deserialize(&mut reader)?;

    assert_eq!(restored.len(), list.len());
    for (i, word) in words.iter().enumerate() {
        assert_eq!(restored.get_str(i as u32), *word);
    }

    Ok(())
}

#[test]
fn test_front_coded_list_from_lines() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(777);
    let words = sorted_word_list(150, &mut rng);
    let text = words.join("\n");

    let list = FrontCodedList::<i8>::from_lines(text.as_bytes(), 4)?;
    assert_eq!(list.len() as usize, words.len());
    for (i, word) in words.iter().enumerate() {
        assert_eq!(list.get_str(i as u32), *word);
    }

    Ok(())
}

#[test]
fn test_front_coded_list_cursor_bidirectional_random_walk() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(55);
    let words = sorted_word_list(200, &mut rng);
    let list = FrontCodedList::<i8>::from_arrays(5, words.iter().map(|w| w.as_bytes()))?;

    let mut cursor = list.iter();
    let mut i: usize = 0;
    for _ in 0..2000 {
        if i < words.len() && (i == 0 || rng.gen_bool(0.7)) {
            let array = cursor.next();
            let bytes: Vec<u8> = bytemuck::cast_vec(array);
            assert_eq!(String::from_utf8(bytes).unwrap(), words[i]);
            i += 1;
        } else if i > 0 {
            i -= 1;
            let array = cursor.previous();
            let bytes: Vec<u8> = bytemuck::cast_vec(array);
            assert_eq!(String::from_utf8(bytes).unwrap(), words[i]);
        }
    }

    Ok(())
}

#[test]
fn test_front_coded_list_get_into_partial_reads() -> Result<()> {
    let words = vec![
        "hello".to_string(),
        "helloworld".to_string(),
        "helloworldwide".to_string(),
    ];
    let list = FrontCodedList::<i8>::from_arrays(2, words.iter().map(|w| w.as_bytes()))?;

    for (i, word) in words.iter().enumerate() {
        let full_len = word.len();
        for cap in 0..=full_len + 2 {
            let mut dst = vec![0i8; cap];
            let result = list.get_into(i as u32, &mut dst, 0, cap);
            if cap as i64 >= full_len as i64 {
                assert_eq!(result, full_len as i64);
                let bytes: Vec<u8> = bytemuck::cast_vec(dst[..full_len].to_vec());
                assert_eq!(String::from_utf8(bytes).unwrap(), *word);
            } else {
                assert_eq!(result, cap as i64 - full_len as i64);
                let bytes: Vec<u8> = bytemuck::cast_vec(dst.clone());
                assert_eq!(bytes, word.as_bytes()[..cap]);
            }
        }
    }

    Ok(())
}
