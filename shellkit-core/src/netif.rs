//! Local network interface enumeration.
//!
//! Produces `(address, mask)` pairs as dotted IPv4 strings.  Windows reads
//! `GetAdaptersInfo`; other hosts use `sysinfo::Networks`.  Enumeration
//! failures are logged and yield an empty list.

use std::net::Ipv4Addr;

use serde::Serialize;

/// One IPv4 address bound to a local interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterfaceAddress {
    pub address: String,
    pub mask: String,
}

/// Dotted subnet mask for a CIDR prefix length (clamped to 32).
pub fn prefix_to_mask(prefix: u8) -> Ipv4Addr {
    let prefix = u32::from(prefix.min(32));
    let bits = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Ipv4Addr::from(bits)
}

/// Enumerate interface addresses.  Never fails; see module docs.
pub fn list_interfaces() -> Vec<InterfaceAddress> {
    let mut out: Vec<InterfaceAddress> = Vec::new();
    for entry in platform::collect() {
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    log::debug!("{} interface address(es) found", out.len());
    out
}

#[cfg(windows)]
mod platform {
    use windows::Win32::NetworkManagement::IpHelper::{
        GetAdaptersInfo, IP_ADAPTER_INFO, IP_ADDR_STRING,
    };

    use super::InterfaceAddress;

    const NO_ERROR: u32 = 0;
    const ERROR_BUFFER_OVERFLOW: u32 = 111;
    const MAX_ATTEMPTS: usize = 3;

    /// Read a fixed NUL-terminated ANSI buffer (`CHAR` is a one-byte newtype).
    fn ansi<T>(buf: &[T]) -> String {
        let bytes = unsafe {
            std::slice::from_raw_parts(buf.as_ptr().cast::<u8>(), std::mem::size_of_val(buf))
        };
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        String::from_utf8_lossy(&bytes[..len]).into_owned()
    }

    pub(super) fn collect() -> Vec<InterfaceAddress> {
        let mut size: u32 = 0;
        let rc = unsafe { GetAdaptersInfo(None, &mut size) };
        if rc != ERROR_BUFFER_OVERFLOW && rc != NO_ERROR {
            log::warn!("GetAdaptersInfo sizing call failed: {rc}");
            return Vec::new();
        }

        for _ in 0..MAX_ATTEMPTS {
            // u64 backing keeps IP_ADAPTER_INFO suitably aligned.
            let mut buf = vec![0u64; (size as usize).div_ceil(8).max(1)];
            let head = buf.as_mut_ptr().cast::<IP_ADAPTER_INFO>();
            match unsafe { GetAdaptersInfo(Some(head), &mut size) } {
                NO_ERROR => return unsafe { walk(head) },
                ERROR_BUFFER_OVERFLOW => continue,
                rc => {
                    log::warn!("GetAdaptersInfo failed: {rc}");
                    return Vec::new();
                }
            }
        }
        log::warn!("GetAdaptersInfo: buffer kept growing after {MAX_ATTEMPTS} attempts");
        Vec::new()
    }

    unsafe fn walk(head: *const IP_ADAPTER_INFO) -> Vec<InterfaceAddress> {
        let mut out = Vec::new();
        let mut adapter = head;
        while let Some(a) = unsafe { adapter.as_ref() } {
            let mut ip: *const IP_ADDR_STRING = &a.IpAddressList;
            while let Some(entry) = unsafe { ip.as_ref() } {
                let address = ansi(&entry.IpAddress.String);
                if !address.is_empty() && address != "0.0.0.0" {
                    out.push(InterfaceAddress {
                        address,
                        mask: ansi(&entry.IpMask.String),
                    });
                }
                ip = entry.Next;
            }
            adapter = a.Next;
        }
        out
    }
}

#[cfg(not(windows))]
mod platform {
    use std::net::IpAddr;

    use sysinfo::Networks;

    use super::{prefix_to_mask, InterfaceAddress};

    pub(super) fn collect() -> Vec<InterfaceAddress> {
        let networks = Networks::new_with_refreshed_list();
        let mut entries: Vec<_> = networks.list().iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = Vec::new();
        for (_name, data) in entries {
            for net in data.ip_networks() {
                if let IpAddr::V4(addr) = net.addr {
                    out.push(InterfaceAddress {
                        address: addr.to_string(),
                        mask: prefix_to_mask(net.prefix).to_string(),
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_to_mask() {
        assert_eq!(prefix_to_mask(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(prefix_to_mask(0), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(prefix_to_mask(32), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(prefix_to_mask(20), Ipv4Addr::new(255, 255, 240, 0));
        assert_eq!(prefix_to_mask(40), Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn test_list_interfaces_is_well_formed() {
        for entry in list_interfaces() {
            assert!(entry.address.parse::<Ipv4Addr>().is_ok(), "{entry:?}");
            assert!(entry.mask.parse::<Ipv4Addr>().is_ok(), "{entry:?}");
        }
    }

    #[test]
    fn test_interface_address_serialization() {
        let a = InterfaceAddress {
            address: "192.168.1.20".into(),
            mask: "255.255.255.0".into(),
        };
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"address":"192.168.1.20","mask":"255.255.255.0"}"#);
    }
}
