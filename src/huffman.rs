//! Length-limited canonical Huffman codes via package-merge.
//!
//! `package_merge` produces per-symbol code lengths bounded by `max_len`;
//! `canonical_codes` turns a length assignment into the actual codes per
//! RFC 1951 §3.2.2. The two are split because block type 1 only needs
//! `canonical_codes` (over the fixed, already-known lengths), while block
//! type 2 needs both.

/// One entry in a package-merge list: either an original leaf (a symbol
/// with its frequency) or a package formed by combining two items from the
/// previous list, whose cost is their sum.
#[derive(Clone, Copy)]
struct Item {
    symbol: u16,
    cost: u32,
    merged: bool,
}

/// Build the initial leaf list: one item per symbol with nonzero frequency,
/// sorted ascending by cost. DEFLATE's canonical coder cannot represent a
/// one-symbol alphabet, so the zero- and one-symbol cases are patched up
/// with synthetic cost-1 leaves before sorting.
fn setup_originals(frequencies: &[u32]) -> Vec<Item> {
    let mut originals: Vec<Item> = frequencies
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f > 0)
        .map(|(i, &f)| Item { symbol: i as u16, cost: f, merged: false })
        .collect();

    if originals.is_empty() {
        originals.push(Item { symbol: 0, cost: 1, merged: false });
    }
    if originals.len() == 1 {
        let other = (originals[0].symbol as usize + 1) % frequencies.len();
        originals.push(Item { symbol: other as u16, cost: 1, merged: false });
    }

    originals.sort_by_key(|item| item.cost);
    originals
}

/// Pair up adjacent items of `list` into packages (dropping a trailing
/// unpaired item), then merge the package costs with `originals`,
/// preserving ascending order, truncated to `cap` items.
fn package_and_merge(list: &[Item], originals: &[Item], cap: usize) -> Vec<Item> {
    let num_packages = list.len() / 2;
    let package_costs: Vec<u32> =
        (0..num_packages).map(|i| list[2 * i].cost + list[2 * i + 1].cost).collect();

    let mut merged = Vec::with_capacity(cap);
    let (mut j, mut k) = (0usize, 0usize);
    while merged.len() < cap && j < package_costs.len() && k < originals.len() {
        if package_costs[j] < originals[k].cost {
            merged.push(Item { symbol: 0, cost: package_costs[j], merged: true });
            j += 1;
        } else {
            merged.push(originals[k]);
            k += 1;
        }
    }
    while merged.len() < cap && j < package_costs.len() {
        merged.push(Item { symbol: 0, cost: package_costs[j], merged: true });
        j += 1;
    }
    while merged.len() < cap && k < originals.len() {
        merged.push(originals[k]);
        k += 1;
    }
    merged
}

/// Walk the first `num` items of `list`: packages count towards the next
/// (lower) list's contribution, leaves get their symbol's code length
/// bumped by one. Returns twice the number of packages seen, i.e. how many
/// items of the next list down this call implies.
fn interpret(list: &[Item], num: usize, code_lengths: &mut [u16]) -> usize {
    let mut num_merged = 0;
    for item in &list[..num.min(list.len())] {
        if item.merged {
            num_merged += 1;
        } else {
            code_lengths[item.symbol as usize] += 1;
        }
    }
    2 * num_merged
}

/// Produce code lengths `<= max_len` for an alphabet of `num_symbols`
/// symbols given their frequencies (`frequencies.len() == num_symbols`).
/// Unused symbols (`frequencies[i] == 0`) get code length 0.
pub fn package_merge(max_len: u32, num_symbols: usize, frequencies: &[u32]) -> Vec<u16> {
    debug_assert_eq!(frequencies.len(), num_symbols);
    debug_assert!(max_len >= 2);

    let originals = setup_originals(frequencies);
    let cap = 2 * originals.len() - 2;

    let mut lists: Vec<Vec<Item>> = vec![package_and_merge(&originals, &originals, cap)];
    for _ in 1..(max_len - 1) {
        let next = package_and_merge(lists.last().unwrap(), &originals, cap);
        lists.push(next);
    }

    let mut code_lengths = vec![0u16; num_symbols];
    let last = lists.last().unwrap();
    let mut num = interpret(last, last.len(), &mut code_lengths);
    for list in lists[..lists.len() - 1].iter().rev() {
        num = interpret(list, num, &mut code_lengths);
    }
    interpret(&originals, num, &mut code_lengths);

    code_lengths
}

/// Assign canonical prefix codes from a per-symbol length table (RFC 1951
/// §3.2.2). Lengths must not exceed 15.
pub fn canonical_codes(lengths: &[u16]) -> Vec<u16> {
    let max_length = lengths.iter().copied().max().unwrap_or(0) as usize;
    let mut count = vec![0u32; max_length + 1];
    for &len in lengths {
        debug_assert!(len <= 15);
        count[len as usize] += 1;
    }
    count[0] = 0;

    let mut next_code = vec![0u32; max_length + 1];
    let mut code = 0u32;
    for len in 1..=max_length {
        code = (code + count[len - 1]) << 1;
        next_code[len] = code;
    }

    let mut codes = vec![0u16; lengths.len()];
    for (symbol, &len) in lengths.iter().enumerate() {
        if len > 0 {
            codes[symbol] = next_code[len as usize] as u16;
            next_code[len as usize] += 1;
        }
    }
    codes
}

/// Kraft sum `Σ 2^-length` over used symbols, as an exact rational
/// (numerator, log2 denominator), used by tests to check the package-merge
/// bound without floating point.
#[cfg(test)]
fn kraft_sum_le_one(lengths: &[u16]) -> bool {
    let max_length = lengths.iter().copied().max().unwrap_or(0);
    if max_length == 0 {
        return true;
    }
    let denom: u64 = 1u64 << max_length;
    let numerator: u64 =
        lengths.iter().filter(|&&l| l > 0).map(|&l| denom >> l).sum();
    numerator <= denom
}
