pub mod all;
pub mod buffer;
pub mod buffer_count;
pub mod buffer_time;
pub mod cache;
pub mod combine_latest;
pub mod concat;
pub mod filter;
pub mod finalize;
pub mod flat_map;
pub mod group_by;
pub mod map;
pub mod materialize;
pub mod merge;
pub mod observe_on;
pub mod on_error;
pub mod reduce;
pub mod sample;
pub mod scan;
pub mod skip;
pub mod start_with;
pub mod subscribe_on;
pub mod switch_on_next;
pub mod synchronize;
pub mod take;
pub mod take_last;
pub mod take_until;
pub mod take_while;
pub mod timestamp;
pub mod to_list;
pub mod zip;
