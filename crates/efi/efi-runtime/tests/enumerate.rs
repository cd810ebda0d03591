//! Variable store enumeration against an in-memory firmware.

mod common;

use common::StubDevice;
use efi_runtime::Error;
use efi_runtime::enumerate::{VariableEntry, variable_names};
use efi_types::{EfiGuid, EfiStatus};
use nix::errno::Errno;

const VENDOR: EfiGuid = EfiGuid::from_text_fields(
    0x1234_5678,
    0x9abc,
    0xdef0,
    0x0102,
    [0x03, 0x04, 0x05, 0x06, 0x07, 0x08],
);

fn three_variables() -> StubDevice {
    StubDevice::with_variables(&[
        ("BootOrder", EfiGuid::GLOBAL_VARIABLE, &[0, 0]),
        ("Timeout", EfiGuid::GLOBAL_VARIABLE, &[5, 0]),
        ("VendorSetting", VENDOR, &[1]),
    ])
}

#[test]
fn walks_every_pair_then_stops() {
    let mut device = three_variables();
    let entries: Vec<VariableEntry> = variable_names(&mut device, 1024)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        entries,
        vec![
            VariableEntry {
                name: "BootOrder".into(),
                guid: EfiGuid::GLOBAL_VARIABLE
            },
            VariableEntry {
                name: "Timeout".into(),
                guid: EfiGuid::GLOBAL_VARIABLE
            },
            VariableEntry {
                name: "VendorSetting".into(),
                guid: VENDOR
            },
        ]
    );
    // Three entries plus the call that answered NOT_FOUND.
    assert_eq!(device.next_name_calls, 4);
}

#[test]
fn no_calls_after_the_end() {
    let mut device = three_variables();
    {
        let mut names = variable_names(&mut device, 64).unwrap();
        while names.next().is_some() {}
        assert!(names.next().is_none());
        assert!(names.next().is_none());
    }
    assert_eq!(device.next_name_calls, 4);
}

#[test]
fn empty_store_yields_nothing() {
    let mut device = StubDevice::default();
    assert_eq!(variable_names(&mut device, 2).unwrap().count(), 0);
    assert_eq!(device.next_name_calls, 1);
}

#[test]
fn small_buffer_reports_required_size_and_stops() {
    let mut device = three_variables();
    {
        // "BootOrder" needs 20 bytes; 16 is too small.
        let mut names = variable_names(&mut device, 16).unwrap();
        match names.next() {
            Some(Err(Error::BufferTooSmall { required })) => assert_eq!(required, 20),
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
        assert!(names.next().is_none());
    }
    assert_eq!(device.next_name_calls, 1);
}

#[test]
fn grow_resumes_at_the_same_position() {
    let mut device = three_variables();
    let mut names = variable_names(&mut device, 22).unwrap();

    assert_eq!(names.next().unwrap().unwrap().name, "BootOrder");
    assert_eq!(names.next().unwrap().unwrap().name, "Timeout");
    let required = match names.next() {
        Some(Err(Error::BufferTooSmall { required })) => required,
        other => panic!("expected BufferTooSmall, got {other:?}"),
    };
    assert_eq!(required, 28);

    names.grow(required).unwrap();
    assert_eq!(names.buffer_size(), 28);
    assert_eq!(
        names.next().unwrap().unwrap(),
        VariableEntry {
            name: "VendorSetting".into(),
            guid: VENDOR
        }
    );
    assert!(names.next().is_none());
}

#[test]
fn buffer_size_must_be_even_and_at_least_one_unit() {
    let mut device = StubDevice::default();
    for size in [0, 1, 3, 1023] {
        assert!(matches!(
            variable_names(&mut device, size),
            Err(Error::InvalidBufferSize(s)) if s == size
        ));
    }
    let mut names = variable_names(&mut device, 2).unwrap();
    assert!(matches!(names.grow(5), Err(Error::InvalidBufferSize(5))));
    assert_eq!(names.buffer_size(), 2);
}

#[test]
fn firmware_error_is_yielded_once() {
    let mut device = three_variables();
    device.fail_next_name_at = Some((2, EfiStatus::DEVICE_ERROR));
    {
        let mut names = variable_names(&mut device, 64).unwrap();
        assert_eq!(names.next().unwrap().unwrap().name, "BootOrder");
        assert!(matches!(
            names.next(),
            Some(Err(Error::Status(EfiStatus::DEVICE_ERROR)))
        ));
        assert!(names.next().is_none());
    }
    assert_eq!(device.next_name_calls, 2);
}

#[test]
fn grow_does_not_rewind_a_finished_walk() {
    let mut device = three_variables();
    {
        let mut names = variable_names(&mut device, 64).unwrap();
        assert_eq!(names.by_ref().count(), 3);
        names.grow(128).unwrap();
        assert_eq!(names.buffer_size(), 128);
        assert!(names.next().is_none());
    }
    assert_eq!(device.next_name_calls, 4);
}

#[test]
fn device_failure_ends_the_walk() {
    let mut device = three_variables();
    device.broken = Some(Errno::EIO);
    let mut names = variable_names(&mut device, 64).unwrap();
    assert!(matches!(
        names.next(),
        Some(Err(Error::Ioctl {
            source: Errno::EIO,
            ..
        }))
    ));
    assert!(names.next().is_none());
}

#[test]
fn status_errors_carry_the_code() {
    let err = Error::Status(EfiStatus::DEVICE_ERROR);
    assert_eq!(err.status(), Some(EfiStatus::DEVICE_ERROR));
    assert_eq!(
        Error::BufferTooSmall { required: 8 }.status(),
        Some(EfiStatus::BUFFER_TOO_SMALL)
    );
}
