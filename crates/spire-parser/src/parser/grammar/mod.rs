pub(crate) mod argument;
pub(crate) mod directive;
pub(crate) mod document;
pub(crate) mod field;
pub(crate) mod fragment;
pub(crate) mod name;
pub(crate) mod operation;
pub(crate) mod selection;
pub(crate) mod ty;
pub(crate) mod value;
pub(crate) mod variable;
