//! Typed bindings for the plasma root contract.

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    contract PlasmaMVP {
        event Deposit(address depositor, uint256 amount, uint256 depositNonce, uint256 ethBlockNum);
        event StartedTransactionExit(uint256[3] position, address owner, uint256 amount, bytes confirmSignatures, uint256 committedFee);
        event StartedDepositExit(uint256 nonce, address owner, uint256 amount);
        event ChallengedExit(uint256[4] position, address owner, uint256 amount);
        event FinalizedExit(uint256[4] position, address owner, uint256 amount);

        function operator() external view returns (address);
        function lastCommittedBlock() external view returns (uint256);
        function deposits(uint256 nonce) external view returns (address owner, uint256 amount, uint256 createdAt, uint256 ethBlockNum);
        function txExits(uint256 priority) external view returns (uint256 amount, uint256 committedFee, uint256 createdAt, address owner, uint8 state);
        function depositExits(uint256 nonce) external view returns (uint256 amount, uint256 committedFee, uint256 createdAt, address owner, uint8 state);
        function submitBlock(bytes32[] headers, uint256[] txnsPerBlock, uint256[] feesPerBlock, uint256 blockNum) external;
    }
}
