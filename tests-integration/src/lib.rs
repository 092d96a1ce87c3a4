//! Integration tests exercising the public promptdock API end to end

#[cfg(test)]
mod commands;
#[cfg(test)]
mod end_to_end;
#[cfg(test)]
mod file_store;
