#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod debounce;
pub mod counter;
pub mod button;
pub mod render;
pub mod led;

#[cfg(test)]
mod testing;


/// Put a value into static memory, once: returns `&'static mut T`.
/// Panics if called twice at the same call site.
#[cfg(target_os = "none")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}
