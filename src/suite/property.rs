//! `OfxPropertySuite` v1.

use std::ffi::{CStr, CString, c_char, c_double, c_int, c_void};
use std::slice;

use crate::abi::{OfxPropertySetHandle, OfxPropertySuiteV1, OfxStatus};
use crate::error::{Error, Result};
use crate::model::property::{PropertySet, PropertyValue, SLOT_COUNT};
use crate::model::registry::{ObjectKey, Registry, from_handle};
use crate::suite::{dispatch, read_str, write_out};

pub static PROPERTY_SUITE_V1: OfxPropertySuiteV1 = OfxPropertySuiteV1 {
    prop_set_pointer,
    prop_set_string,
    prop_set_double,
    prop_set_int,
    prop_set_pointer_n,
    prop_set_string_n,
    prop_set_double_n,
    prop_set_int_n,
    prop_get_pointer,
    prop_get_string,
    prop_get_double,
    prop_get_int,
    prop_get_pointer_n,
    prop_get_string_n,
    prop_get_double_n,
    prop_get_int_n,
    prop_reset,
    prop_get_dimension,
};

fn component(index: c_int) -> Result<usize> {
    usize::try_from(index).map_err(|_| Error::BadIndex(i64::from(index)))
}

fn count(count: c_int) -> Result<usize> {
    usize::try_from(count)
        .ok()
        .filter(|n| *n <= SLOT_COUNT)
        .ok_or(Error::BadIndex(i64::from(count)))
}

/// Decode the set handle and key of a property call, in that order.
unsafe fn target<'a>(
    registry: &'a mut Registry,
    set: OfxPropertySetHandle,
    key: *const c_char,
) -> Result<(&'a mut PropertySet, &'a str)> {
    let set: ObjectKey = from_handle(set)?;
    let set = registry.property_set_mut(set)?;
    let key = unsafe { read_str(key) }?;
    Ok((set, key))
}

unsafe fn set_one<T: PropertyValue>(
    entry: &'static str,
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    value: impl FnOnce() -> Result<T>,
) -> OfxStatus {
    dispatch(entry, |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        set.set(key, component(index)?, value()?)
    })
}

unsafe fn get_one<T: PropertyValue, U>(
    entry: &'static str,
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    dst: *mut U,
    convert: impl FnOnce(&T) -> U,
) -> OfxStatus {
    dispatch(entry, |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        let value = convert(set.get::<T>(key, component(index)?)?);
        unsafe { write_out(dst, value) }
    })
}

unsafe fn set_many<T: PropertyValue, U: Copy>(
    entry: &'static str,
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    src: *const U,
    convert: impl Fn(U) -> Result<T>,
) -> OfxStatus {
    dispatch(entry, |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        let n = count(n)?;
        if n > 0 && src.is_null() {
            return Err(Error::InvalidValue("null value array".to_string()));
        }
        let values = if n == 0 {
            Vec::new()
        } else {
            // SAFETY: the plugin passes `n` values.
            unsafe { slice::from_raw_parts(src, n) }
                .iter()
                .map(|v| convert(*v))
                .collect::<Result<Vec<T>>>()?
        };
        set.set_all(key, &values)
    })
}

unsafe fn get_many<T: PropertyValue, U>(
    entry: &'static str,
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    dst: *mut U,
    convert: impl Fn(&T) -> U,
) -> OfxStatus {
    dispatch(entry, |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        let n = count(n)?;
        if n > 0 && dst.is_null() {
            return Err(Error::InvalidValue("null output array".to_string()));
        }
        for i in 0..n {
            let value = convert(set.get::<T>(key, i)?);
            // SAFETY: the plugin provides room for `n` values.
            unsafe { dst.add(i).write(value) };
        }
        Ok(())
    })
}

fn owned_string(value: *const c_char) -> Result<CString> {
    if value.is_null() {
        return Err(Error::InvalidValue("null string".to_string()));
    }
    // SAFETY: non-null strings from the plugin are nul-terminated.
    Ok(unsafe { CStr::from_ptr(value) }.to_owned())
}

unsafe extern "C" fn prop_set_pointer(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    value: *mut c_void,
) -> OfxStatus {
    unsafe { set_one("propSetPointer", set, key, index, || Ok(value)) }
}

unsafe extern "C" fn prop_set_string(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    value: *const c_char,
) -> OfxStatus {
    unsafe { set_one("propSetString", set, key, index, || owned_string(value)) }
}

unsafe extern "C" fn prop_set_double(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    value: c_double,
) -> OfxStatus {
    unsafe { set_one("propSetDouble", set, key, index, || Ok(value)) }
}

unsafe extern "C" fn prop_set_int(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    value: c_int,
) -> OfxStatus {
    unsafe { set_one("propSetInt", set, key, index, || Ok(value)) }
}

unsafe extern "C" fn prop_set_pointer_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    values: *const *mut c_void,
) -> OfxStatus {
    unsafe { set_many("propSetPointerN", set, key, n, values, Ok) }
}

unsafe extern "C" fn prop_set_string_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    values: *const *const c_char,
) -> OfxStatus {
    unsafe { set_many("propSetStringN", set, key, n, values, owned_string) }
}

unsafe extern "C" fn prop_set_double_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    values: *const c_double,
) -> OfxStatus {
    unsafe { set_many("propSetDoubleN", set, key, n, values, Ok) }
}

unsafe extern "C" fn prop_set_int_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    values: *const c_int,
) -> OfxStatus {
    unsafe { set_many("propSetIntN", set, key, n, values, Ok) }
}

unsafe extern "C" fn prop_get_pointer(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    dst: *mut *mut c_void,
) -> OfxStatus {
    unsafe { get_one("propGetPointer", set, key, index, dst, |v: &*mut c_void| *v) }
}

/// The returned pointer stays valid until the slot is overwritten or the set
/// is destroyed.
unsafe extern "C" fn prop_get_string(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    dst: *mut *const c_char,
) -> OfxStatus {
    unsafe { get_one("propGetString", set, key, index, dst, |v: &CString| v.as_ptr()) }
}

unsafe extern "C" fn prop_get_double(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    dst: *mut c_double,
) -> OfxStatus {
    unsafe { get_one("propGetDouble", set, key, index, dst, |v: &f64| *v) }
}

unsafe extern "C" fn prop_get_int(
    set: OfxPropertySetHandle,
    key: *const c_char,
    index: c_int,
    dst: *mut c_int,
) -> OfxStatus {
    unsafe { get_one("propGetInt", set, key, index, dst, |v: &i32| *v) }
}

unsafe extern "C" fn prop_get_pointer_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    dst: *mut *mut c_void,
) -> OfxStatus {
    unsafe { get_many("propGetPointerN", set, key, n, dst, |v: &*mut c_void| *v) }
}

unsafe extern "C" fn prop_get_string_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    dst: *mut *const c_char,
) -> OfxStatus {
    unsafe { get_many("propGetStringN", set, key, n, dst, |v: &CString| v.as_ptr()) }
}

unsafe extern "C" fn prop_get_double_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    dst: *mut c_double,
) -> OfxStatus {
    unsafe { get_many("propGetDoubleN", set, key, n, dst, |v: &f64| *v) }
}

unsafe extern "C" fn prop_get_int_n(
    set: OfxPropertySetHandle,
    key: *const c_char,
    n: c_int,
    dst: *mut c_int,
) -> OfxStatus {
    unsafe { get_many("propGetIntN", set, key, n, dst, |v: &i32| *v) }
}

unsafe extern "C" fn prop_reset(set: OfxPropertySetHandle, key: *const c_char) -> OfxStatus {
    dispatch("propReset", |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        set.reset(key)
    })
}

unsafe extern "C" fn prop_get_dimension(
    set: OfxPropertySetHandle,
    key: *const c_char,
    dst: *mut c_int,
) -> OfxStatus {
    dispatch("propGetDimension", |registry| {
        let (set, key) = unsafe { target(registry, set, key) }?;
        let dimension = set.dimension(key)? as c_int;
        unsafe { write_out(dst, dimension) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;
    use crate::model::registry::{to_handle, with_registry};
    use std::ptr;

    fn new_set() -> OfxPropertySetHandle {
        with_registry(|registry| to_handle(registry.create_property_set()))
    }

    #[test]
    fn test_unset_reads_are_defaults() {
        let set = new_set();
        let mut int = 7;
        let mut double = 7.0;
        let mut text: *const c_char = ptr::null();
        let mut pointer: *mut c_void = ptr::dangling_mut::<u8>().cast();
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_get_int)(set, c"a".as_ptr(), 0, &mut int), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_double)(set, c"b".as_ptr(), 3, &mut double), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_string)(set, c"c".as_ptr(), 1, &mut text), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_pointer)(set, c"d".as_ptr(), 2, &mut pointer), 0);
            assert_eq!(CStr::from_ptr(text), c"");
        }
        assert_eq!(int, 0);
        assert_eq!(double, 0.0);
        assert!(pointer.is_null());
    }

    #[test]
    fn test_set_get_string() {
        let set = new_set();
        let mut text: *const c_char = ptr::null();
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_set_string)(set, c"name".as_ptr(), 0, c"cube".as_ptr()), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_string)(set, c"name".as_ptr(), 0, &mut text), 0);
            assert_eq!(CStr::from_ptr(text), c"cube");
        }
    }

    #[test]
    fn test_bad_index_and_handles() {
        let set = new_set();
        let mut int = 0;
        unsafe {
            let status = (PROPERTY_SUITE_V1.prop_get_int)(set, c"n".as_ptr(), 4, &mut int);
            assert_eq!(status, Status::ErrBadIndex.code());
            let status = (PROPERTY_SUITE_V1.prop_set_int)(set, c"n".as_ptr(), -1, 1);
            assert_eq!(status, Status::ErrBadIndex.code());
            let status = (PROPERTY_SUITE_V1.prop_get_int)(ptr::null_mut(), c"n".as_ptr(), 0, &mut int);
            assert_eq!(status, Status::ErrBadHandle.code());
        }

        with_registry(|registry| {
            let key = from_handle(set).unwrap();
            registry.release(key).unwrap();
        });
        let status = unsafe { (PROPERTY_SUITE_V1.prop_get_int)(set, c"n".as_ptr(), 0, &mut int) };
        assert_eq!(status, Status::ErrBadHandle.code());
    }

    #[test]
    fn test_type_mismatch() {
        let set = new_set();
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_set_int)(set, c"k".as_ptr(), 0, 1), 0);
            let status = (PROPERTY_SUITE_V1.prop_set_double)(set, c"k".as_ptr(), 0, 1.0);
            assert_eq!(status, Status::ErrValue.code());
        }
    }

    #[test]
    fn test_vector_accessors_and_dimension() {
        let set = new_set();
        let values = [1.0, 2.0, 3.0];
        let mut out = [0.0; 3];
        let mut dimension = 0;
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_set_double_n)(set, c"v".as_ptr(), 3, values.as_ptr()), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_double_n)(set, c"v".as_ptr(), 3, out.as_mut_ptr()), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_dimension)(set, c"v".as_ptr(), &mut dimension), 0);
            let status = (PROPERTY_SUITE_V1.prop_set_double_n)(set, c"v".as_ptr(), 5, values.as_ptr());
            assert_eq!(status, Status::ErrBadIndex.code());
        }
        assert_eq!(out, values);
        assert_eq!(dimension, 3);
    }

    #[test]
    fn test_string_vectors() {
        let set = new_set();
        let values = [c"a".as_ptr(), c"b".as_ptr()];
        let mut out = [ptr::null::<c_char>(); 2];
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_set_string_n)(set, c"s".as_ptr(), 2, values.as_ptr()), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_string_n)(set, c"s".as_ptr(), 2, out.as_mut_ptr()), 0);
            assert_eq!(CStr::from_ptr(out[0]), c"a");
            assert_eq!(CStr::from_ptr(out[1]), c"b");
        }
    }

    #[test]
    fn test_reset_and_unknown_keys() {
        let set = new_set();
        let mut int = 0;
        let mut dimension = 0;
        unsafe {
            assert_eq!((PROPERTY_SUITE_V1.prop_set_int)(set, c"k".as_ptr(), 1, 5), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_reset)(set, c"k".as_ptr()), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_get_int)(set, c"k".as_ptr(), 1, &mut int), 0);
            assert_eq!((PROPERTY_SUITE_V1.prop_reset)(set, c"missing".as_ptr()), Status::ErrUnknown.code());
            let status = (PROPERTY_SUITE_V1.prop_get_dimension)(set, c"missing".as_ptr(), &mut dimension);
            assert_eq!(status, Status::ErrUnknown.code());
        }
        assert_eq!(int, 0);
    }
}
