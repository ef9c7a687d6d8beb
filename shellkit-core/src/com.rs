//! COM apartment RAII guard.
//!
//! [`ComGuard`] wraps `CoInitializeEx` / `CoUninitialize` so that every
//! shell call that needs COM initialises the calling thread and balances it
//! on every exit path, including early returns and panics.
//!
//! The `PhantomData<*const ()>` field enforces `!Send` + `!Sync` at compile
//! time, preventing the guard from being moved across thread boundaries.

use windows::Win32::System::Com::{
    CoInitializeEx, CoUninitialize, COINIT, COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE,
    COINIT_MULTITHREADED,
};

use crate::errors::ShellKitError;

const RPC_E_CHANGED_MODE: u32 = 0x8001_0106;

/// Apartment model requested by [`ComGuard::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apartment {
    /// Single-threaded apartment; what the shell objects expect.
    SingleThreaded,
    MultiThreaded,
}

impl Apartment {
    fn flags(self) -> COINIT {
        match self {
            Apartment::SingleThreaded => {
                COINIT(COINIT_APARTMENTTHREADED.0 | COINIT_DISABLE_OLE1DDE.0)
            }
            Apartment::MultiThreaded => COINIT_MULTITHREADED,
        }
    }
}

/// RAII wrapper that calls `CoUninitialize` on `Drop` when appropriate.
///
/// The guard tracks whether `CoInitializeEx` actually succeeded (vs.
/// `RPC_E_CHANGED_MODE`) and only calls `CoUninitialize` when a balancing
/// call is required per MSDN.
#[must_use = "ComGuard must be kept alive for the duration of COM usage"]
pub struct ComGuard {
    should_uninit: bool,
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ComGuard {
    /// Initialise (or join) the thread's COM apartment.
    ///
    /// Returns `Ok` for `S_OK`, `S_FALSE`, and `RPC_E_CHANGED_MODE` (the
    /// thread already lives in the other apartment model; COM is usable but
    /// we must NOT call `CoUninitialize`).
    pub fn init(apartment: Apartment) -> Result<Self, ShellKitError> {
        let hr = unsafe { CoInitializeEx(None, apartment.flags()) };

        let hresult_value = hr.0 as u32;
        match hresult_value {
            // S_OK (newly initialised) or S_FALSE (already initialised).
            0x0 | 0x1 => Ok(Self {
                should_uninit: true,
                _not_send: std::marker::PhantomData,
            }),
            RPC_E_CHANGED_MODE => {
                log::warn!(
                    "CoInitializeEx: RPC_E_CHANGED_MODE -- requested {apartment:?}, \
                     using the thread's existing apartment"
                );
                Ok(Self {
                    should_uninit: false,
                    _not_send: std::marker::PhantomData,
                })
            }
            _ => Err(ShellKitError::ComError(format!(
                "CoInitializeEx failed: HRESULT 0x{hresult_value:08X}"
            ))),
        }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.should_uninit {
            unsafe { CoUninitialize() };
        }
    }
}
