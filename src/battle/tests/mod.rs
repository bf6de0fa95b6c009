pub mod common;

#[cfg(test)]
mod test_resolve_turn;



#[cfg(test)]
mod test_targeting_and_swap;
