//! GPIO interrupt binding for the button.
//!
//! The pin is configured as an input with the internal pull-up and
//! interrupts on the rising edge. The ISR receives the pin number as its
//! argument, reads the clock and hands the edge to the debounce handler.
//! It never blocks, allocates or logs.

use core::ffi::c_void;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use btn2slack::config::EVENT_QUEUE_DEPTH;
use btn2slack::{EdgeHandler, MonotonicClock};
use esp_idf_svc::sys::{self, esp, EspError};

use super::clock::EspTimerClock;

type Handler = EdgeHandler<'static, EVENT_QUEUE_DEPTH>;

/// Target of the ISR, set once by [`install`].
static TARGET: AtomicPtr<Handler> = AtomicPtr::new(ptr::null_mut());

/// Default `gpio_install_isr_service` flags.
const ESP_INTR_FLAG_DEFAULT: i32 = 0;

/// Configure `pin` and route its rising edges to `handler`.
pub fn install(pin: u32, handler: &'static Handler) -> Result<(), EspError> {
    TARGET.store(handler as *const Handler as *mut Handler, Ordering::Release);

    let io_conf = sys::gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: sys::gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: sys::gpio_int_type_t_GPIO_INTR_POSEDGE,
        ..Default::default()
    };

    unsafe {
        esp!(sys::gpio_config(&io_conf))?;
        esp!(sys::gpio_install_isr_service(ESP_INTR_FLAG_DEFAULT))?;
        esp!(sys::gpio_isr_handler_add(
            pin as sys::gpio_num_t,
            Some(on_button_edge),
            pin as usize as *mut c_void,
        ))?;
    }
    Ok(())
}

unsafe extern "C" fn on_button_edge(arg: *mut c_void) {
    let pin = arg as usize as u32;
    let now = EspTimerClock.now();

    // SAFETY: only ever set from a `&'static Handler`.
    if let Some(handler) = unsafe { TARGET.load(Ordering::Acquire).as_ref() } {
        // Fire-and-forget: a suppressed or dropped edge is not an error here.
        let _ = handler.on_edge(pin, now);
    }
}
