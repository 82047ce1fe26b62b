pub mod attrition;
