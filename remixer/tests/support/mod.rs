#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use remixer::prelude::*;

/// Counts callback invocations
pub fn counter() -> (Rc<Cell<usize>>, impl FnMut(&RemixValue) + 'static) {
    let count = Rc::new(Cell::new(0));
    let inner = count.clone();
    (count, move |_: &RemixValue| inner.set(inner.get() + 1))
}

/// Records every value a callback sees
pub fn recorder() -> (Rc<RefCell<Vec<RemixValue>>>, impl FnMut(&RemixValue) + 'static)
{
    let seen = Rc::new(RefCell::new(Vec::new()));
    let inner = seen.clone();
    (seen, move |value: &RemixValue| inner.borrow_mut().push(value.clone()))
}

pub fn volume() -> VariableBuilder {
    Variable::range("vol", 15.0, (0.0, 20.0), 5.0).title("Volume")
}
