#![allow(dead_code)]

use calltap::{
    BoxError, Callbacks,
    testing::{TestHandle, TestMemory, TestNode, TestPayloads, expr},
};
use lazy_static::lazy_static;
use std::sync::Mutex;

pub type Scripted = Callbacks<TestPayloads, TestHandle>;
pub type Native = Callbacks<TestPayloads>;

// ============================================================================
// Plain function callables
// ============================================================================

lazy_static! {
    pub static ref FN_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
}

pub fn take_fn_log() -> Vec<&'static str> {
    std::mem::take(&mut *FN_LOG.lock().unwrap())
}

pub fn read_from_target(mem: &mut TestMemory) -> Result<(), BoxError> {
    FN_LOG.lock().unwrap().push("read_from_target");
    mem.value = Some(mem.address.wrapping_mul(3));
    Ok(())
}

pub fn zero_fill(mem: &mut TestMemory) -> Result<(), BoxError> {
    FN_LOG.lock().unwrap().push("zero_fill");
    mem.value = Some(0);
    Ok(())
}

/// Folds `x + 0` into `x`.
pub fn drop_add_zero(node: TestNode) -> Result<TestNode, BoxError> {
    FN_LOG.lock().unwrap().push("drop_add_zero");
    if let calltap::testing::Expr::Add(lhs, rhs) = &*node {
        if **rhs == calltap::testing::Expr::Const(0) {
            return Ok(lhs.clone());
        }
    }
    Ok(node)
}

pub fn x_plus_zero() -> TestNode {
    expr::add(expr::var("x"), expr::constant(0))
}

lazy_static! {
    static ref SERIAL: Mutex<()> = Mutex::new(());
}

/// Serializes tests that share [`FN_LOG`].
pub fn serial() -> std::sync::MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    FN_LOG.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clear();
    guard
}
