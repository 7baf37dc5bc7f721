use llrb_multimap::{SortedMap, SortedMultiMap};

fn main() {
    // A small category axis: series values indexed by category label.
    let mut axis: SortedMultiMap<&str, u32> = SortedMultiMap::new();

    axis.insert("oranges", 7);
    axis.assert_invariants();
    println!("{:?}", axis.keys().collect::<Vec<_>>());

    axis.insert("apples", 4);
    axis.assert_invariants();
    println!("{:?}", axis.keys().collect::<Vec<_>>());

    axis.insert("apples", 1);
    axis.assert_invariants();
    println!("{:?}", axis.keys().collect::<Vec<_>>());

    axis.insert("pears", 2);
    axis.assert_invariants();
    println!("{:?}", axis.keys().collect::<Vec<_>>());

    axis.insert("apples", 4);
    axis.assert_invariants();
    println!("{:?}", axis.keys().collect::<Vec<_>>());

    println!(
        "apples -> {:?}",
        axis.values_for_key(&"apples").collect::<Vec<_>>()
    );
    println!("span: {:?} ..= {:?}", axis.min_key(), axis.max_key());

    let removed = axis.remove(&"apples", &4);
    assert!(removed);
    axis.assert_invariants();
    println!("after remove: {axis:?}");

    let mut totals: SortedMap<&str, u32> = SortedMap::new();
    for (category, value) in &axis {
        let total = totals.get(category).copied().unwrap_or(0);
        totals.insert(*category, total + *value);
    }
    println!("totals: {totals:?}");

    let mut dot = String::new();
    axis.dotgraph("axis", &mut dot)
        .expect("writing to a String cannot fail");
    println!("{dot}");
}
