// Copyright 2025 The Hidra Authors
// SPDX-License-Identifier: Apache-2.0

//! Genome scanner (spec §4.G): splits raw genome source text into
//! positionally-indexed gene byte sequences.

/// Splits `source` into per-gene byte sequences. Whitespace is stripped,
/// text is upper-cased, then split on the literal separator `GN`; the
/// fragment's position in the resulting array is its gene id. Each
/// fragment has non-hex characters filtered out, is left-zero-padded to
/// even length, and is hex-decoded.
pub fn scan_genome(source: &str) -> Vec<Vec<u8>> {
    let normalized: String = source.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase();

    normalized.split("GN").map(decode_gene_fragment).collect()
}

fn decode_gene_fragment(fragment: &str) -> Vec<u8> {
    let mut hex: String = fragment.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    if hex.len() % 2 != 0 {
        hex.insert(0, '0');
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    let chars: Vec<char> = hex.chars().collect();
    for pair in chars.chunks(2) {
        let byte_str: String = pair.iter().collect();
        if let Ok(byte) = u8::from_str_radix(&byte_str, 16) {
            bytes.push(byte);
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_literal_gn_with_positional_ids() {
        let genes = scan_genome("GN01GN02GN03");
        // Leading "GN" produces an empty gene 0, then 01, 02, 03.
        assert_eq!(genes, vec![vec![], vec![0x01], vec![0x02], vec![0x03]]);
    }

    #[test]
    fn whitespace_is_stripped_and_case_is_normalized() {
        let genes = scan_genome("gn 0a\n1f ");
        assert_eq!(genes, vec![vec![], vec![0x0a, 0x1f]]);
    }

    #[test]
    fn odd_length_fragment_is_left_zero_padded() {
        let genes = scan_genome("GNabc");
        assert_eq!(genes, vec![vec![], vec![0x0a, 0xbc]]);
    }

    #[test]
    fn non_hex_characters_are_filtered() {
        let genes = scan_genome("GNa!b@c#d");
        assert_eq!(genes, vec![vec![], vec![0xab, 0xcd]]);
    }
}
