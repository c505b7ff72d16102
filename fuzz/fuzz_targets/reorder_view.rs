#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use teachtask_core::model::{Item, Priority, Variant};
use teachtask_core::view;

// First byte picks the list size, the rest is a candidate sequence of
// indices into it (out-of-range bytes become unknown ids).
fuzz_target!(|data: &[u8]| {
    let Some((&len, rest)) = data.split_first() else {
        return;
    };
    let Some(now) = Utc.timestamp_opt(1_700_000_000, 0).single() else {
        return;
    };
    let len = usize::from(len % 16);
    let mut items: Vec<Item> = (0..len)
        .map(|i| Item::new(i.to_string(), "goal", Priority::HIGH, now))
        .collect();
    view::renumber(&mut items, Variant::Todo);

    let ids: Vec<String> = rest.iter().map(|b| b.to_string()).collect();
    if let Ok(arranged) = view::reorder(&items, &ids, Variant::Todo) {
        assert_eq!(arranged.len(), items.len());
        for (position, item) in arranged.iter().enumerate() {
            assert_eq!(item.order, position);
            assert_eq!(item.priority, Priority::from_position(position));
            assert_eq!(item.id, ids[position]);
        }
    }
});
