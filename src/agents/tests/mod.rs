#[cfg(test)]
mod indicators;
#[cfg(test)]
mod strategy;
